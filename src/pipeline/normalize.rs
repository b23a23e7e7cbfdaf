//! Document normalizer: upload → ordered page images.
//!
//! | Declared type      | Result                                            |
//! |--------------------|---------------------------------------------------|
//! | `image/*`          | one page, bytes and media type untouched          |
//! | `application/pdf`  | one PNG per page, in document order               |
//! | anything else      | [`AnalyzerError::UnsupportedFormat`]              |
//!
//! The result is never empty, and for PDFs it is all-or-nothing.

use crate::document::{ArtifactKind, PageImage, UploadedArtifact};
use crate::error::AnalyzerError;
use crate::pipeline::render::{self, RenderOptions};
use std::sync::Arc;
use tracing::{debug, info};

/// Normalize an upload into the page images sent to the model.
///
/// `None` stands for "the user submitted without choosing a file".
pub async fn normalize(
    artifact: Option<&UploadedArtifact>,
    options: &RenderOptions,
) -> Result<Vec<PageImage>, AnalyzerError> {
    let artifact = artifact.ok_or(AnalyzerError::NoFileProvided)?;

    let pages = match artifact.kind() {
        ArtifactKind::Image => vec![passthrough(artifact)],
        ArtifactKind::Pdf => {
            let pdf: Arc<[u8]> = Arc::from(artifact.bytes.as_slice());
            render::render_pdf(pdf, options)
                .await?
                .into_iter()
                .map(PageImage::png)
                .collect()
        }
        ArtifactKind::Unsupported => return Err(unsupported(artifact)),
    };

    finish(artifact, pages)
}

/// Synchronous counterpart of [`normalize`] for callers outside a runtime.
pub fn normalize_blocking(
    artifact: Option<&UploadedArtifact>,
    options: &RenderOptions,
) -> Result<Vec<PageImage>, AnalyzerError> {
    let artifact = artifact.ok_or(AnalyzerError::NoFileProvided)?;

    let pages = match artifact.kind() {
        ArtifactKind::Image => vec![passthrough(artifact)],
        ArtifactKind::Pdf => render::render_pdf_blocking(&artifact.bytes, options)?
            .into_iter()
            .map(PageImage::png)
            .collect(),
        ArtifactKind::Unsupported => return Err(unsupported(artifact)),
    };

    finish(artifact, pages)
}

fn passthrough(artifact: &UploadedArtifact) -> PageImage {
    debug!(
        "'{}' is an image ({}), passing through {} bytes",
        artifact.name,
        artifact.media_type,
        artifact.bytes.len()
    );
    PageImage::new(artifact.media_type.clone(), artifact.bytes.clone())
}

fn unsupported(artifact: &UploadedArtifact) -> AnalyzerError {
    AnalyzerError::UnsupportedFormat {
        media_type: artifact.media_type.clone(),
    }
}

fn finish(
    artifact: &UploadedArtifact,
    pages: Vec<PageImage>,
) -> Result<Vec<PageImage>, AnalyzerError> {
    if pages.is_empty() {
        return Err(AnalyzerError::EmptyDocument);
    }
    info!("Normalized '{}' into {} page image(s)", artifact.name, pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn image_passes_through_unchanged() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3];
        let artifact = UploadedArtifact::new("image/jpeg", bytes.clone(), "receipt.jpg");

        let pages = normalize(Some(&artifact), &RenderOptions::default())
            .await
            .unwrap();
        assert_eq!(pages, vec![PageImage::new("image/jpeg", bytes)]);
    }

    #[tokio::test]
    async fn image_keeps_declared_type_verbatim() {
        let artifact = UploadedArtifact::new("Image/PNG", vec![1], "scan.png");
        let pages = normalize(Some(&artifact), &RenderOptions::default())
            .await
            .unwrap();
        assert_eq!(pages[0].media_type, "Image/PNG");
    }

    #[tokio::test]
    async fn absent_artifact_fails() {
        let err = normalize(None, &RenderOptions::default()).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::NoFileProvided));
    }

    #[tokio::test]
    async fn text_plain_is_unsupported() {
        let artifact = UploadedArtifact::new("text/plain", b"hello".to_vec(), "notes.txt");
        let err = normalize(Some(&artifact), &RenderOptions::default())
            .await
            .unwrap_err();
        match err {
            AnalyzerError::UnsupportedFormat { media_type } => assert_eq!(media_type, "text/plain"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn blocking_variant_matches() {
        let artifact = UploadedArtifact::new("image/png", vec![9, 9], "a.png");
        let pages = normalize_blocking(Some(&artifact), &RenderOptions::default()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].data, vec![9, 9]);

        assert!(matches!(
            normalize_blocking(None, &RenderOptions::default()),
            Err(AnalyzerError::NoFileProvided)
        ));
        let csv = UploadedArtifact::new("text/csv", vec![], "a.csv");
        assert!(matches!(
            normalize_blocking(Some(&csv), &RenderOptions::default()),
            Err(AnalyzerError::UnsupportedFormat { .. })
        ));
    }

    #[tokio::test]
    async fn empty_image_is_still_one_page() {
        // Validating image contents is the model's concern, not ours.
        let artifact = UploadedArtifact::new("image/png", Vec::new(), "empty.png");
        let pages = normalize(Some(&artifact), &RenderOptions::default())
            .await
            .unwrap();
        assert_eq!(pages.len(), 1);
    }
}
