//! CSV output: one appended row per processed receipt.
//!
//! The file is opened in append mode for each row and closed again when the
//! writer drops. The header goes in first only when the file is empty at open
//! time, so repeated runs against the same file keep a single header.

use crate::error::ReceiptError;
use crate::record::{ParsedReceipt, CSV_HEADER};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

/// Append `record` to the CSV at `path`, creating the file (and its parent
/// directories) when needed.
///
/// Header and row are buffered and flushed together.
pub fn append_record(path: &Path, record: &ParsedReceipt) -> Result<(), ReceiptError> {
    let io_err = |source: std::io::Error| ReceiptError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source: csv::Error| ReceiptError::Csv {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    let is_new = file.metadata().map_err(io_err)?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if is_new {
        debug!("Writing CSV header to {}", path.display());
        writer.write_record(CSV_HEADER).map_err(csv_err)?;
    }
    writer.write_record(record.to_row()).map_err(csv_err)?;
    writer.flush().map_err(io_err)?;

    Ok(())
}
