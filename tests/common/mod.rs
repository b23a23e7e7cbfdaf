//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use findoc_analyzer::{ContentGenerator, ContentItem, ProviderError};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

/// Set in CI so a missing pdfium fails the run instead of skipping.
pub const REQUIRE_PDFIUM_VAR: &str = "FINDOC_REQUIRE_PDFIUM";

/// Skip the current test when no pdfium library can be bound, unless
/// `FINDOC_REQUIRE_PDFIUM` is set, in which case fail it.
#[macro_export]
macro_rules! skip_without_pdfium {
    () => {
        if let Err(e) = findoc_analyzer::pipeline::render::bind_pdfium() {
            if std::env::var_os($crate::common::REQUIRE_PDFIUM_VAR).is_some() {
                panic!("pdfium required but not available: {e}");
            }
            println!("SKIP: pdfium not available ({e})");
            return;
        }
    };
}

/// Build a valid PDF whose pages have the given `(width, height)` in points.
///
/// Pages carry no content; they render as blank pages of the right shape.
pub fn pdf_with_pages(sizes: &[(u32, u32)]) -> Vec<u8> {
    let page_ids: Vec<usize> = (0..sizes.len()).map(|i| i + 3).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", sizes.len()),
    ];
    for (w, h) in sizes {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] /Resources << >> >>"
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

/// Portrait US Letter.
pub const PORTRAIT: (u32, u32) = (612, 792);
/// Landscape US Letter.
pub const LANDSCAPE: (u32, u32) = (792, 612);

/// A small solid-colour PNG.
pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([250, 250, 240]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Generator that records every request and replies with a fixed answer.
pub struct RecordingGenerator {
    reply: Result<String, String>,
    pub calls: Mutex<Vec<Vec<ContentItem>>>,
}

impl RecordingGenerator {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Vec<ContentItem> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ContentGenerator for RecordingGenerator {
    fn name(&self) -> &str {
        "recording"
    }

    fn model(&self) -> &str {
        "recording-model"
    }

    async fn generate(&self, items: &[ContentItem]) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(items.to_vec());
        self.reply.clone().map_err(ProviderError::Provider)
    }
}
