//! Progress-callback trait for per-file scan events.
//!
//! Inject an [`Arc<dyn ScanProgressCallback>`] via
//! [`crate::config::ScanConfigBuilder::progress_callback`] to receive events
//! as the orchestrator walks the input directory.
//!
//! # Example
//!
//! ```rust
//! use receipt2csv::{CompletionError, ScanProgressCallback, ScanConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     recorded: AtomicUsize,
//! }
//!
//! impl ScanProgressCallback for CountingCallback {
//!     fn on_file_recorded(&self, file: &str, fields_found: usize, error: Option<&CompletionError>) {
//!         self.recorded.fetch_add(1, Ordering::SeqCst);
//!         match error {
//!             Some(e) => eprintln!("{file}: {e}"),
//!             None => eprintln!("{file}: {fields_found} fields"),
//!         }
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { recorded: AtomicUsize::new(0) });
//!
//! let config = ScanConfig::builder()
//!     .progress_callback(counter as Arc<dyn ScanProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::CompletionError;
use std::sync::Arc;

/// Called by the orchestrator as it processes each file.
///
/// Files are processed one at a time, so calls never overlap, but the trait
/// is `Send + Sync` so a config holding it can cross threads. All methods have
/// no-op defaults.
pub trait ScanProgressCallback: Send + Sync {
    /// Called once after the directory listing, before any file is read.
    fn on_run_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before text extraction starts for a file.
    fn on_file_start(&self, file: &str, index: usize, total_files: usize) {
        let _ = (file, index, total_files);
    }

    /// Called when a file yields no text and no row is written.
    ///
    /// `reason` is `None` when OCR ran but found nothing.
    fn on_file_skipped(&self, file: &str, reason: Option<&str>) {
        let _ = (file, reason);
    }

    /// Called after a row is appended.
    ///
    /// `fields_found` counts the keys the model returned. `error` is set when
    /// the completion failed and the row carries only the file name; a
    /// successful reply of `{}` arrives with zero fields and no error.
    fn on_file_recorded(&self, file: &str, fields_found: usize, error: Option<&CompletionError>) {
        let _ = (file, fields_found, error);
    }

    /// Called once after every file has been attempted.
    fn on_run_complete(&self, total_files: usize, rows_written: usize) {
        let _ = (total_files, rows_written);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ScanProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ScanConfig`].
pub type ProgressCallback = Arc<dyn ScanProgressCallback>;
