//! PDF rasterisation: render every page of an in-memory PDF to PNG via pdfium.
//!
//! pdfium is a blocking C++ library, so the async entry points move the work
//! onto `spawn_blocking`. Pages are rendered in document order and each page
//! is PNG-encoded as soon as it is rendered, so at most one bitmap is alive
//! at a time. Any page failure aborts the whole document.
//!
//! The longest edge of each page is capped at `max_rendered_pixels`
//! regardless of physical page size, keeping images within what vision
//! models accept.

use crate::error::AnalyzerError;
use crate::pipeline::encode;
use pdfium_render::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Environment variable pointing at an existing pdfium shared library.
pub const PDFIUM_LIB_PATH_VAR: &str = "PDFIUM_LIB_PATH";

/// Smallest longest-edge a page is rendered at.
pub const MIN_RENDERED_PIXELS: u32 = 100;

/// How PDF pages are rasterised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Longest edge of a rendered page in pixels.
    pub max_rendered_pixels: u32,
    /// User password for encrypted PDFs.
    pub password: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_rendered_pixels: 2000,
            password: None,
        }
    }
}

/// Bind to the pdfium shared library.
///
/// Uses `PDFIUM_LIB_PATH` when set, then a library next to the executable's
/// working directory, then the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, AnalyzerError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_VAR) {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path)
            .map_err(|e| AnalyzerError::PdfiumBindingFailed(format!("{path}: {e:?}")))?,
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| AnalyzerError::PdfiumBindingFailed(format!("{e:?}")))?,
    };
    Ok(Pdfium::new(bindings))
}

/// Render every page of `pdf` to PNG bytes, in page order.
pub async fn render_pdf(
    pdf: Arc<[u8]>,
    options: &RenderOptions,
) -> Result<Vec<Vec<u8>>, AnalyzerError> {
    let options = options.clone();
    tokio::task::spawn_blocking(move || render_pdf_blocking(&pdf, &options))
        .await
        .map_err(|e| AnalyzerError::Internal(format!("Render task panicked: {e}")))?
}

/// Blocking implementation of [`render_pdf`].
pub fn render_pdf_blocking(
    pdf: &[u8],
    options: &RenderOptions,
) -> Result<Vec<Vec<u8>>, AnalyzerError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf, options.password.as_deref())?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let max_px = clamp_pixels(options.max_rendered_pixels);
    let render_config = PdfRenderConfig::new()
        .set_target_width(max_px)
        .set_maximum_height(max_px);

    let mut results = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            AnalyzerError::RasterisationFailed {
                page: page_num,
                detail: format!("{e:?}"),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );

        let png = encode::encode_png(&image).map_err(|e| AnalyzerError::RasterisationFailed {
            page: page_num,
            detail: format!("PNG encoding failed: {e}"),
        })?;
        results.push(png);
    }

    Ok(results)
}

/// pdfium takes an `i32` target size; `RenderOptions` fields are public and
/// may bypass the builder's floor.
fn clamp_pixels(px: u32) -> i32 {
    px.clamp(MIN_RENDERED_PIXELS, i32::MAX as u32) as i32
}

/// Count the pages of `pdf` without rendering them.
pub async fn page_count(pdf: Arc<[u8]>, password: Option<String>) -> Result<usize, AnalyzerError> {
    tokio::task::spawn_blocking(move || page_count_blocking(&pdf, password.as_deref()))
        .await
        .map_err(|e| AnalyzerError::Internal(format!("Page count task panicked: {e}")))?
}

/// Blocking implementation of [`page_count`].
pub fn page_count_blocking(pdf: &[u8], password: Option<&str>) -> Result<usize, AnalyzerError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf, password)?;
    Ok(document.pages().len() as usize)
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf: &'a [u8],
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, AnalyzerError> {
    pdfium
        .load_pdf_from_byte_slice(pdf, password)
        .map_err(|e| classify_load_error(&format!("{e:?}"), password.is_some()))
}

/// Map a pdfium load failure to a password or corruption error.
fn classify_load_error(detail: &str, password_given: bool) -> AnalyzerError {
    if detail.contains("Password") || detail.contains("password") {
        if password_given {
            AnalyzerError::WrongPassword
        } else {
            AnalyzerError::PasswordRequired
        }
    } else {
        AnalyzerError::CorruptPdf {
            detail: detail.to_string(),
        }
    }
}
