//! Error types for the findoc-analyzer library.
//!
//! Two layers of error reflect the two halves of an analysis:
//!
//! * [`AnalyzerError`]: everything a caller of the library can see. Input
//!   problems (no file, unsupported type, unreadable PDF), configuration
//!   problems (missing credential) and a single catch-all for the remote
//!   model call.
//!
//! * [`crate::provider::ProviderError`]: what a [`crate::provider::ContentGenerator`]
//!   returns. It never escapes the library: the requester wraps it into
//!   [`AnalyzerError::RemoteAnalysisFailure`] with the original message.
//!
//! Nothing here is retried. The collaborator (the CLI, a web form, …) shows
//! the message plus [`AnalyzerError::hint`] and lets the user resubmit.

use std::path::PathBuf;
use thiserror::Error;

/// Formats a user can submit, as shown in hints.
pub const SUPPORTED_FORMATS: &str = "JPG, JPEG, PNG, PDF";

/// All errors returned by the findoc-analyzer library.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Normalizer errors ─────────────────────────────────────────────────
    /// No document was supplied to the normalizer.
    #[error("No file was uploaded. Please upload an image or PDF.")]
    NoFileProvided,

    /// The declared media type is neither an image nor a PDF.
    #[error("Unsupported file type: {media_type}")]
    UnsupportedFormat { media_type: String },

    /// The PDF buffer could not be opened by pdfium.
    #[error("PDF is corrupt or unreadable: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    /// The document produced no pages at all.
    #[error("Document contains no pages")]
    EmptyDocument,

    /// pdfium or the PNG encoder failed on a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Input resolution errors ───────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The path exists but could not be read (a directory, an I/O error, …).
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Remote model errors ───────────────────────────────────────────────
    /// Anything that went wrong on the way to, or inside, the remote model.
    ///
    /// Authentication, quota, network and malformed-request failures are
    /// deliberately not told apart.
    #[error("Remote analysis failed: {message}")]
    RemoteAnalysisFailure { message: String },

    /// A named provider could not be constructed (missing key, unknown name).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Configuration errors ──────────────────────────────────────────────
    /// The API credential is not present in the environment.
    #[error("{var} not found. Please set your API key in environment variables.")]
    MissingCredential { var: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF pages are rendered with pdfium, which must be installed separately.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Or install libpdfium into a system library directory.\n"
    )]
    PdfiumBindingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the exported analysis file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalyzerError {
    /// `true` for failures that happen while turning the upload into pages.
    ///
    /// These all surface to the user the same way as an unsupported format.
    pub fn is_processing_failure(&self) -> bool {
        matches!(
            self,
            AnalyzerError::UnsupportedFormat { .. }
                | AnalyzerError::CorruptPdf { .. }
                | AnalyzerError::PasswordRequired
                | AnalyzerError::WrongPassword
                | AnalyzerError::EmptyDocument
                | AnalyzerError::RasterisationFailed { .. }
        )
    }

    /// User-facing follow-up advice to print under the error message.
    pub fn hint(&self) -> Option<String> {
        match self {
            AnalyzerError::NoFileProvided => Some(format!(
                "Please upload a document to analyze. Supported formats: {SUPPORTED_FORMATS}"
            )),
            AnalyzerError::RemoteAnalysisFailure { .. } => {
                Some("Please ensure the document is clear and try again.".to_string())
            }
            AnalyzerError::MissingCredential { var } => {
                Some(format!("Try: export {var}=... (or add it to a .env file)"))
            }
            e if e.is_processing_failure() => {
                Some(format!("Supported formats: {SUPPORTED_FORMATS}"))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_carries_media_type() {
        let e = AnalyzerError::UnsupportedFormat {
            media_type: "text/plain".into(),
        };
        assert!(e.to_string().contains("text/plain"), "got: {e}");
        assert!(e.hint().unwrap().contains("PDF"));
    }

    #[test]
    fn corrupt_pdf_surfaces_like_unsupported_format() {
        let corrupt = AnalyzerError::CorruptPdf {
            detail: "bad xref".into(),
        };
        let unsupported = AnalyzerError::UnsupportedFormat {
            media_type: "text/csv".into(),
        };
        assert!(corrupt.is_processing_failure());
        assert_eq!(corrupt.hint(), unsupported.hint());
    }

    #[test]
    fn remote_failure_suggests_retry() {
        let e = AnalyzerError::RemoteAnalysisFailure {
            message: "HTTP 429: quota exceeded".into(),
        };
        assert!(e.to_string().contains("quota exceeded"));
        assert!(e.hint().unwrap().contains("try again"));
        assert!(!e.is_processing_failure());
    }

    #[test]
    fn no_file_hint_lists_formats() {
        let hint = AnalyzerError::NoFileProvided.hint().unwrap();
        assert!(hint.contains(SUPPORTED_FORMATS));
    }

    #[test]
    fn missing_credential_names_variable() {
        let e = AnalyzerError::MissingCredential {
            var: "GOOGLE_API_KEY".into(),
        };
        assert!(e.to_string().starts_with("GOOGLE_API_KEY not found"));
    }

    #[test]
    fn internal_error_has_no_hint() {
        assert!(AnalyzerError::Internal("boom".into()).hint().is_none());
    }
}
