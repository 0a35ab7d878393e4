//! Per-file text extraction.
//!
//! PDFs are rasterised page by page and each page is OCR'd; the page texts are
//! joined with `\n` in page order. Anything else is decoded as a single image
//! and OCR'd directly. The result is trimmed.
//!
//! Failures come back as [`ExtractError`] values. The orchestrator logs them
//! and treats the file as having no text, so one bad scan never stops a run.

use crate::error::ExtractError;
use crate::pipeline::input::is_pdf;
use crate::pipeline::ocr::{OcrEngine, TesseractOcr};
use crate::pipeline::render::render_pdf_pages;
use image::{DynamicImage, ImageReader};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Turns a receipt file into plain text.
pub trait TextExtractor {
    /// Extract trimmed text from `path`. `Ok("")` means the file was read but
    /// nothing legible was found.
    fn extract(&self, path: &Path) -> impl Future<Output = Result<String, ExtractError>> + Send;
}

/// [`TextExtractor`] that rasterises/decodes locally and hands images to an
/// [`OcrEngine`].
#[derive(Debug, Clone)]
pub struct OcrTextExtractor<O> {
    ocr: O,
    max_rendered_pixels: u32,
}

impl<O: OcrEngine + Sync> OcrTextExtractor<O> {
    pub fn new(ocr: O, max_rendered_pixels: u32) -> Self {
        Self {
            ocr,
            max_rendered_pixels,
        }
    }

    /// OCR each image in order and join the texts with `\n`.
    ///
    /// Stops at the first failing page; partial text is discarded.
    pub async fn ocr_pages(&self, pages: &[DynamicImage]) -> Result<String, ExtractError> {
        let mut texts = Vec::with_capacity(pages.len());
        for (idx, page) in pages.iter().enumerate() {
            let text = self.ocr.recognize(page).await?;
            debug!("Page {}: {} chars", idx + 1, text.len());
            texts.push(text);
        }
        Ok(texts.join("\n"))
    }
}

impl Default for OcrTextExtractor<TesseractOcr> {
    fn default() -> Self {
        Self::new(TesseractOcr::default(), 2000)
    }
}

impl<O: OcrEngine + Sync> TextExtractor for OcrTextExtractor<O> {
    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let pages = load_pages(path.to_path_buf(), self.max_rendered_pixels).await?;
        let text = self.ocr_pages(&pages).await?;
        Ok(text.trim().to_string())
    }
}

/// Load the images to OCR for one file: every page of a PDF, or the single
/// decoded image.
async fn load_pages(path: PathBuf, max_pixels: u32) -> Result<Vec<DynamicImage>, ExtractError> {
    let pdf = is_pdf(&path);
    let task_path = path.clone();

    tokio::task::spawn_blocking(move || {
        if pdf {
            render_pdf_pages(&task_path, max_pixels)
        } else {
            decode_image(&task_path).map(|img| vec![img])
        }
    })
    .await
    .map_err(|e| ExtractError::Io {
        path,
        detail: format!("loader task panicked: {e}"),
    })?
}

/// Decode an image, sniffing the format from content when the extension is
/// missing or wrong.
fn decode_image(path: &Path) -> Result<DynamicImage, ExtractError> {
    let io_err = |e: std::io::Error| ExtractError::Io {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?
        .decode()
        .map_err(|e| match e {
            image::ImageError::IoError(e) => io_err(e),
            other => ExtractError::UnsupportedImage {
                path: path.to_path_buf(),
                detail: other.to_string(),
            },
        })
}
