//! Image encoding: `DynamicImage` → PNG bytes, and bytes → base64.
//!
//! Pages are kept as raw PNG bytes inside [`crate::document::PageImage`];
//! base64 is applied only when a provider serialises its request body.
//! PNG is lossless, so small print on statements stays crisp.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as PNG.
///
/// The output depends only on the pixels, so rendering the same page twice
/// yields identical bytes.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} page → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

/// Standard base64 (with padding), as expected by inline-image APIs.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
