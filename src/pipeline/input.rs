//! Input resolution: turn a user-supplied path or URL into an [`UploadedArtifact`].
//!
//! The library itself works on in-memory bytes. This stage is what a
//! front end does before calling the normalizer: read the file (or download
//! it), decide on the declared media type and remember a display name.
//!
//! Media type precedence: an explicit override, then the HTTP `Content-Type`
//! for downloads, then a guess from the file name.

use crate::document::{guess_media_type, UploadedArtifact};
use crate::error::AnalyzerError;
use std::path::Path;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a local path or HTTP/HTTPS URL into an artifact held in memory.
pub async fn resolve_input(
    input: &str,
    media_type_override: Option<&str>,
    timeout_secs: u64,
) -> Result<UploadedArtifact, AnalyzerError> {
    let mut artifact = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(Path::new(input)).await?
    };

    if let Some(mt) = media_type_override.filter(|m| !m.trim().is_empty()) {
        artifact.media_type = mt.trim().to_string();
    }
    debug!(
        "Resolved '{}' as {} ({} bytes)",
        artifact.name,
        artifact.media_type,
        artifact.bytes.len()
    );
    Ok(artifact)
}

/// Read a local file, mapping I/O failures to typed errors.
async fn read_local(path: &Path) -> Result<UploadedArtifact, AnalyzerError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => AnalyzerError::PermissionDenied {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::NotFound => AnalyzerError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => AnalyzerError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(UploadedArtifact::new(guess_media_type(&name), bytes, name))
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<UploadedArtifact, AnalyzerError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AnalyzerError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            AnalyzerError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            AnalyzerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(AnalyzerError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let name = filename_from_url(url);
    let media_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(usable_content_type)
        .unwrap_or_else(|| guess_media_type(&name));

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AnalyzerError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes ({})", bytes.len(), media_type);
    Ok(UploadedArtifact::new(media_type, bytes.to_vec(), name))
}

/// Keep a `Content-Type` header only when it says something specific.
fn usable_content_type(header: &str) -> Option<String> {
    let essence = header.split(';').next()?.trim().to_ascii_lowercase();
    match essence.as_str() {
        "" | "application/octet-stream" | "binary/octet-stream" => None,
        _ => Some(essence),
    }
}

/// Last path segment of the URL, or `downloaded` if it has none.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }
    "downloaded".to_string()
}
