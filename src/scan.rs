//! Run orchestration: walk the input folder and push each receipt through
//! extract → prompt → complete → append.
//!
//! Files are handled strictly one after another. A file that yields no text
//! is skipped without a row; a file whose completion fails still gets a row
//! carrying only its name. Only directory and CSV I/O failures end the run.

use crate::config::ScanConfig;
use crate::error::{ExtractError, ReceiptError};
use crate::output::{FileOutcome, RunSummary};
use crate::pipeline::extract::{OcrTextExtractor, TextExtractor};
use crate::pipeline::input::{list_receipts, ReceiptFile};
use crate::pipeline::llm::{ChatCompletionClient, Completer};
use crate::pipeline::ocr::TesseractOcr;
use crate::pipeline::writer::append_record;
use crate::prompts::build_prompt;
use crate::record::ParsedReceipt;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The default extractor: pdfium + Tesseract.
pub type DefaultExtractor = OcrTextExtractor<TesseractOcr>;

/// Drives a scan with a given extractor and completer.
///
/// # Example
/// ```rust,no_run
/// use receipt2csv::{ReceiptScanner, ScanConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ScanConfig::builder()
///     .api_key(std::env::var("OPENROUTER_API_KEY")?)
///     .build()?;
/// let summary = ReceiptScanner::from_config(config)?.run().await?;
/// eprintln!("{} rows written", summary.stats.rows_written);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReceiptScanner<E, C> {
    config: ScanConfig,
    extractor: E,
    completer: C,
}

impl ReceiptScanner<DefaultExtractor, ChatCompletionClient> {
    /// Build a scanner with the Tesseract extractor and the HTTP completer.
    pub fn from_config(config: ScanConfig) -> Result<Self, ReceiptError> {
        let extractor = default_extractor(&config);
        let completer = ChatCompletionClient::from_config(&config)?;
        Ok(Self::new(config, extractor, completer))
    }
}

impl<E: TextExtractor, C: Completer> ReceiptScanner<E, C> {
    pub fn new(config: ScanConfig, extractor: E, completer: C) -> Self {
        Self {
            config,
            extractor,
            completer,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Process every regular file in the input folder.
    ///
    /// Re-running appends again; rows are never deduplicated.
    pub async fn run(&self) -> Result<RunSummary, ReceiptError> {
        let start = Instant::now();
        let files = list_receipts(&self.config.input_dir).await?;
        let total = files.len();
        info!(
            "Scanning {} files in {}",
            total,
            self.config.input_dir.display()
        );

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_run_start(total);
        }

        let mut summary = RunSummary::default();
        for (i, file) in files.iter().enumerate() {
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_file_start(&file.file_name, i + 1, total);
            }
            let outcome = self.process_file(file).await?;
            summary.push(outcome);
        }
        summary.stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Scan complete: {} rows written, {} skipped, {}ms",
            summary.stats.rows_written, summary.stats.skipped_files, summary.stats.duration_ms
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_run_complete(total, summary.stats.rows_written);
        }

        Ok(summary)
    }

    /// Run one file through the pipeline.
    pub async fn process_file(&self, file: &ReceiptFile) -> Result<FileOutcome, ReceiptError> {
        info!("Processing: {}", file.file_name);

        let text = match self.extractor.extract(&file.path).await {
            Ok(text) => text,
            Err(e) => {
                warn!("OCR error on {}: {}", file.path.display(), e);
                return Ok(self.skip(file, Some(e)));
            }
        };
        if text.is_empty() {
            return Ok(self.skip(file, None));
        }
        debug!("{}: {} chars of text", file.file_name, text.len());

        let prompt = build_prompt(&self.config.prompt_template, &text);
        let (mut record, error) = match self.completer.complete(&prompt).await {
            Ok(fields) => (fields, None),
            Err(e) => {
                warn!("Completion failed for {}: {}", file.file_name, e);
                (ParsedReceipt::new(), Some(e))
            }
        };
        let fields_found = record.len();
        record.set_file(file.file_name.as_str());

        append_record(&self.config.output_path, &record)?;

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_file_recorded(&file.file_name, fields_found, error.as_ref());
        }

        Ok(match error {
            None => FileOutcome::Recorded {
                file: file.file_name.clone(),
            },
            Some(error) => FileOutcome::RecordedEmpty {
                file: file.file_name.clone(),
                error,
            },
        })
    }

    fn skip(&self, file: &ReceiptFile, error: Option<ExtractError>) -> FileOutcome {
        info!("Skipped (no text): {}", file.file_name);
        if let Some(ref cb) = self.config.progress_callback {
            let reason = error.as_ref().map(|e| e.to_string());
            cb.on_file_skipped(&file.file_name, reason.as_deref());
        }
        FileOutcome::Skipped {
            file: file.file_name.clone(),
            error,
        }
    }
}

/// The Tesseract-backed extractor described by `config`.
pub fn default_extractor(config: &ScanConfig) -> DefaultExtractor {
    OcrTextExtractor::new(
        TesseractOcr::new(&config.tesseract_path, &config.ocr_language),
        config.max_rendered_pixels,
    )
}

/// Scan `config.input_dir` with the default extractor and HTTP completer.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(ReceiptError)` only for fatal errors: no API key, input folder
/// unreadable, CSV not writable. Per-file failures are reported in the
/// returned [`RunSummary`].
pub async fn scan_directory(config: &ScanConfig) -> Result<RunSummary, ReceiptError> {
    ReceiptScanner::from_config(config.clone())?.run().await
}

/// Synchronous wrapper around [`scan_directory`].
///
/// Creates a temporary tokio runtime internally.
pub fn scan_directory_sync(config: &ScanConfig) -> Result<RunSummary, ReceiptError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReceiptError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(scan_directory(config))
}

/// OCR a single receipt with the default extractor.
///
/// Returns the trimmed text; an empty string means OCR found nothing.
pub async fn extract_text(config: &ScanConfig, path: &Path) -> Result<String, ExtractError> {
    default_extractor(config).extract(path).await
}

/// Text extracted from one file by [`extract_directory`].
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub file_name: String,
    pub text: Result<String, ExtractError>,
}

/// OCR every file in `config.input_dir` without calling the completion API
/// or touching the CSV.
///
/// Does not require an API key.
pub async fn extract_directory<E: TextExtractor>(
    config: &ScanConfig,
    extractor: &E,
) -> Result<Vec<ExtractedFile>, ReceiptError> {
    let files = list_receipts(&config.input_dir).await?;
    let mut out = Vec::with_capacity(files.len());
    for file in files {
        info!("Extracting: {}", file.file_name);
        let text = extractor.extract(&file.path).await;
        if let Err(ref e) = text {
            warn!("OCR error on {}: {}", file.path.display(), e);
        }
        out.push(ExtractedFile {
            file_name: file.file_name,
            text,
        });
    }
    Ok(out)
}
