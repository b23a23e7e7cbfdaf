//! Document data model: what the user uploads and what the model sees.
//!
//! An [`UploadedArtifact`] is the raw upload: bytes plus the media type the
//! uploader declared. The normalizer turns it into an ordered list of
//! [`PageImage`]s, which is the only shape the requester accepts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Media type of PDF uploads.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Raster format every PDF page is rendered to.
pub const PNG_MEDIA_TYPE: &str = "image/png";

/// Media type of the exported analysis file.
pub const DOWNLOAD_MEDIA_TYPE: &str = "text/plain";

/// Suffix appended to the upload's base name for the exported analysis.
pub const DOWNLOAD_SUFFIX: &str = "_financial_analysis";

/// A file as received from the user, before any interpretation.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedArtifact {
    /// Declared media type, e.g. `image/jpeg` or `application/pdf`.
    pub media_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Display name, usually the original file name.
    pub name: String,
}

impl UploadedArtifact {
    pub fn new(
        media_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            media_type: media_type.into(),
            bytes: bytes.into(),
            name: name.into(),
        }
    }

    /// Build an artifact whose media type is guessed from `name`'s extension.
    ///
    /// Unknown extensions become `application/octet-stream`, which the
    /// normalizer later rejects as unsupported.
    pub fn from_named_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let media_type = guess_media_type(&name);
        Self::new(media_type, bytes, name)
    }

    /// Classify the declared media type.
    pub fn kind(&self) -> ArtifactKind {
        ArtifactKind::of(&self.media_type)
    }

    /// Base name of the upload without its extension.
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }
}

impl fmt::Debug for UploadedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedArtifact")
            .field("media_type", &self.media_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("name", &self.name)
            .finish()
    }
}

/// How the normalizer will treat an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Any `image/*` type; passed through untouched.
    Image,
    /// `application/pdf`; rasterised page by page.
    Pdf,
    /// Anything else.
    Unsupported,
}

impl ArtifactKind {
    /// Classify a media type string.
    ///
    /// Comparison ignores ASCII case and any `; param=value` suffix.
    pub fn of(media_type: &str) -> Self {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == PDF_MEDIA_TYPE {
            ArtifactKind::Pdf
        } else if essence.starts_with("image/") && essence.len() > "image/".len() {
            ArtifactKind::Image
        } else {
            ArtifactKind::Unsupported
        }
    }
}

/// One page (or the single image) as sent to the model.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    /// Image media type, e.g. `image/png`.
    pub media_type: String,
    /// Encoded image bytes (PNG, JPEG, …), not base64.
    pub data: Vec<u8>,
}

impl PageImage {
    pub fn new(media_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// A rendered PDF page.
    pub fn png(data: Vec<u8>) -> Self {
        Self::new(PNG_MEDIA_TYPE, data)
    }
}

impl fmt::Debug for PageImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageImage")
            .field("media_type", &self.media_type)
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .finish()
    }
}

/// Guess a media type from a file name or URL path.
pub fn guess_media_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// File stem of `name`, ignoring any directories.
///
/// Falls back to the whole name when it has no usable stem (e.g. `""` or `".."`).
pub fn base_name(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(name)
}

/// File name offered for downloading an analysis of `source_name`.
///
/// `"Q3 report.pdf"` becomes `"Q3 report_financial_analysis.txt"`.
pub fn download_file_name(source_name: &str) -> String {
    let base = base_name(source_name);
    let base = if base.is_empty() { "document" } else { base };
    format!("{base}{DOWNLOAD_SUFFIX}.txt")
}
