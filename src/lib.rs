//! # receipt2csv
//!
//! Pull structured fields out of scanned receipts and append them to a CSV.
//!
//! Each receipt (photo or PDF) is OCR'd locally, the text is dropped into a
//! prompt asking for six fields as JSON, one chat-completion call returns
//! those fields, and a row is appended to the output CSV.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. List     regular files, file-system order, no recursion
//!  ├─ 2. Extract  PDF → pdfium pages → Tesseract; image → Tesseract
//!  ├─ 3. Prompt   substitute text into the field-extraction template
//!  ├─ 4. Complete one POST to the chat-completion endpoint, JSON fields back
//!  └─ 5. Append   File, Date, Total, Tax, Payment Method, Vendor, Receipt Number
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use receipt2csv::{scan_directory, ScanConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::builder()
//!         .input_dir("./assets")
//!         .output_path("parsed_receipts.csv")
//!         .api_key(std::env::var("OPENROUTER_API_KEY")?)
//!         .build()?;
//!     let summary = scan_directory(&config).await?;
//!     eprintln!("{} rows, {} skipped",
//!         summary.stats.rows_written,
//!         summary.stats.skipped_files);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `receipt2csv` binary (clap + anyhow + tracing-subscriber + indicatif + dotenvy) |
//!
//! ## Runtime requirements
//!
//! * `tesseract` on `PATH` (or `ScanConfig::tesseract_path`)
//! * libpdfium for PDF input, via `PDFIUM_LIB_PATH` or the system library path

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod record;
pub mod scan;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ScanConfig, ScanConfigBuilder};
pub use error::{CompletionError, ExtractError, ReceiptError};
pub use output::{FileOutcome, RunStats, RunSummary};
pub use pipeline::extract::{OcrTextExtractor, TextExtractor};
pub use pipeline::llm::{decode_completion, ChatCompletionClient, Completer};
pub use pipeline::ocr::{OcrEngine, TesseractOcr};
pub use pipeline::writer::append_record;
pub use progress::{NoopProgressCallback, ProgressCallback, ScanProgressCallback};
pub use prompts::{build_prompt, DEFAULT_PROMPT_TEMPLATE};
pub use record::{ParsedReceipt, CSV_HEADER};
pub use scan::{
    default_extractor, extract_directory, extract_text, scan_directory, scan_directory_sync,
    ExtractedFile, ReceiptScanner,
};
