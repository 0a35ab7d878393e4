//! OCR: turn one image into plain text.
//!
//! The engine is a black box behind [`OcrEngine`]. The default
//! [`TesseractOcr`] drives the `tesseract` executable, feeding it a PNG on
//! stdin and reading text from stdout (`tesseract stdin stdout -l <lang>`).

use crate::error::ExtractError;
use crate::pipeline::encode::encode_png;
use image::DynamicImage;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Something that reads text off an image.
pub trait OcrEngine {
    /// Recognise the text in `image`. An image with no text yields `Ok("")`.
    fn recognize(
        &self,
        image: &DynamicImage,
    ) -> impl Future<Output = Result<String, ExtractError>> + Send;
}

/// [`OcrEngine`] backed by the Tesseract command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: PathBuf,
    language: String,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    fn engine_name(&self) -> String {
        self.binary.display().to_string()
    }

    async fn run(&self, png: &[u8]) -> Result<String, ExtractError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExtractError::OcrUnavailable {
                engine: self.engine_name(),
                detail: e.to_string(),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| ExtractError::Ocr {
            detail: "tesseract stdin was not captured".into(),
        })?;

        // Feed stdin while draining stdout so neither pipe can fill up and stall.
        let feed = async move {
            stdin.write_all(png).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|e| ExtractError::Ocr {
            detail: format!("waiting for tesseract: {e}"),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Ocr {
                detail: format!("tesseract exited with {}: {}", output.status, stderr.trim()),
            });
        }
        fed.map_err(|e| ExtractError::Ocr {
            detail: format!("writing image to tesseract: {e}"),
        })?;

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract returned {} chars", text.len());
        Ok(text)
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: &DynamicImage) -> Result<String, ExtractError> {
        let png = encode_png(image).map_err(|e| ExtractError::Ocr {
            detail: format!("PNG encoding failed: {e}"),
        })?;
        self.run(&png).await
    }
}
