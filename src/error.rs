//! Error types for the receipt2csv library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`ReceiptError`] — **Fatal**: the run cannot proceed at all (input
//!   directory unreadable, CSV not writable, no API key). Returned as
//!   `Err(ReceiptError)` from the top-level `scan*` functions.
//!
//! * [`ExtractError`] — **Non-fatal**: one file could not be turned into text
//!   (corrupt PDF, unsupported image, OCR engine failure). The file is skipped
//!   and the run continues.
//!
//! * [`CompletionError`] — **Non-fatal**: the completion call for one file
//!   failed. The file still gets a row, with every field except `File` empty.
//!
//! Non-fatal errors are returned as values from each stage and recorded in
//! [`crate::output::FileOutcome`], so callers can log, skip or abort.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the receipt2csv library.
#[derive(Debug, Error)]
pub enum ReceiptError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input directory could not be created or listed.
    #[error("Cannot read input directory '{path}': {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not open or write the output CSV file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV encoder rejected a record.
    #[error("CSV error writing '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No credential for the completion endpoint.
    #[error(
        "No API key configured for the completion endpoint.\n\
Set OPENROUTER_API_KEY or pass --api-key."
    )]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a single file produced no text.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ExtractError {
    /// The file could not be read from disk.
    #[error("Cannot read '{path}': {detail}")]
    Io { path: PathBuf, detail: String },

    /// The file is not an image format we can decode.
    #[error("Cannot decode image '{path}': {detail}")]
    UnsupportedImage { path: PathBuf, detail: String },

    /// pdfium could not open the document.
    #[error("PDF '{path}' is corrupt or encrypted: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium opened the document but a page failed to render.
    #[error("Rasterisation failed for page {page} of '{path}': {detail}")]
    Rasterisation {
        path: PathBuf,
        page: usize,
        detail: String,
    },

    /// No pdfium library could be loaded.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBinding(String),

    /// The OCR engine could not be started.
    #[error("OCR engine '{engine}' is unavailable: {detail}")]
    OcrUnavailable { engine: String, detail: String },

    /// The OCR engine ran but failed.
    #[error("OCR failed: {detail}")]
    Ocr { detail: String },
}

/// Why the completion call for a single file produced no fields.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum CompletionError {
    /// The request never got an HTTP response (DNS, TLS, connect, timeout).
    #[error("Completion request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("Completion API error: {status} {body}")]
    Status { status: u16, body: String },

    /// The envelope or the model's message content was not the expected JSON.
    #[error("Cannot decode completion response: {0}")]
    Decode(String),
}
