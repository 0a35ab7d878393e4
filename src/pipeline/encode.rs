//! Image encoding: `DynamicImage` → PNG bytes for the OCR engine.
//!
//! PNG is lossless; JPEG artefacts around thin receipt print measurably hurt
//! recognition. The bytes stay in memory and are piped to the engine, so no
//! temporary image files are left behind.

use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a page or photo as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}
