//! Pipeline stages for receipt-to-CSV extraction.
//!
//! Each submodule implements exactly one step, so each is testable on its own
//! and the OCR engine or completion backend can be swapped without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ ocr ──▶ prompt ──▶ llm ──▶ postprocess ──▶ writer
//! (list)    (pdfium)   (PNG)      (text)  (template) (HTTP)  (JSON fields)   (CSV row)
//! ```
//!
//! 1. [`input`]   — ensure the input folder exists and list its regular files
//! 2. [`render`]  — rasterise every page of a PDF; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`encode`]  — PNG-encode a page image in memory for the OCR engine
//! 4. [`ocr`]     — turn one image into text ([`ocr::OcrEngine`])
//! 5. [`extract`] — per-file text extraction tying 2–4 together
//! 6. [`llm`]     — the one network call; returns the field mapping
//! 7. [`postprocess`] — unwrap fenced JSON and stringify values
//! 8. [`writer`]  — append one CSV row

pub mod encode;
pub mod extract;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod postprocess;
pub mod render;
pub mod writer;
