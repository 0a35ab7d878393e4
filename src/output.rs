//! Result types returned by a scan run.

use crate::error::{CompletionError, ExtractError};
use serde::{Deserialize, Serialize};

/// What happened to one file in the input directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Text extracted, fields parsed, row appended.
    Recorded { file: String },

    /// Text extracted but the completion failed; a row with only `File`
    /// populated was appended.
    RecordedEmpty {
        file: String,
        error: CompletionError,
    },

    /// No text: nothing appended. `error` is set when extraction failed
    /// rather than simply finding nothing to read.
    Skipped {
        file: String,
        error: Option<ExtractError>,
    },
}

impl FileOutcome {
    pub fn file(&self) -> &str {
        match self {
            FileOutcome::Recorded { file }
            | FileOutcome::RecordedEmpty { file, .. }
            | FileOutcome::Skipped { file, .. } => file,
        }
    }

    /// Whether a CSV row was written for this file.
    pub fn wrote_row(&self) -> bool {
        !matches!(self, FileOutcome::Skipped { .. })
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Regular files found in the input directory.
    pub files_seen: usize,
    /// Rows appended to the CSV.
    pub rows_written: usize,
    /// Files that yielded no text.
    pub skipped_files: usize,
    /// Rows written with empty fields because the completion failed.
    pub completion_failures: usize,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
}

/// Everything a caller learns from [`crate::scan::ReceiptScanner::run`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// One entry per regular file, in processing order.
    pub files: Vec<FileOutcome>,
    pub stats: RunStats,
}

impl RunSummary {
    pub(crate) fn push(&mut self, outcome: FileOutcome) {
        self.stats.files_seen += 1;
        match &outcome {
            FileOutcome::Recorded { .. } => self.stats.rows_written += 1,
            FileOutcome::RecordedEmpty { .. } => {
                self.stats.rows_written += 1;
                self.stats.completion_failures += 1;
            }
            FileOutcome::Skipped { .. } => self.stats.skipped_files += 1,
        }
        self.files.push(outcome);
    }
}
