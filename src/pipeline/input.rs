//! Input discovery: the receipts are the regular files directly inside one
//! folder.
//!
//! The folder is created when missing so a first run against a fresh checkout
//! simply finds nothing to do. Entries keep the order the file system returns
//! them in; nothing is sorted, and subdirectories are not entered.

use crate::error::ReceiptError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One receipt discovered in the input folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptFile {
    /// Full path used for reading.
    pub path: PathBuf,
    /// Bare file name, written to the `File` column.
    pub file_name: String,
}

/// Whether a path should go through the PDF rasteriser.
///
/// Looks at the text after the last `.` of the file name, in any case. A
/// dot-file named `.pdf` counts; a bare name `pdf` with no dot does not.
pub fn is_pdf(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.rsplit_once('.'))
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

/// Create `dir` if needed and list the regular files directly inside it.
///
/// Symlinks are followed; dangling links and anything that is not a regular
/// file are ignored.
pub async fn list_receipts(dir: &Path) -> Result<Vec<ReceiptFile>, ReceiptError> {
    let io_err = |source: std::io::Error| ReceiptError::InputDir {
        path: dir.to_path_buf(),
        source,
    };

    tokio::fs::create_dir_all(dir).await.map_err(io_err)?;

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            debug!("Ignoring non-file entry: {}", path.display());
            continue;
        }
        files.push(ReceiptFile {
            file_name: entry.file_name().to_string_lossy().into_owned(),
            path,
        });
    }

    debug!("Found {} files in {}", files.len(), dir.display());
    Ok(files)
}
