//! The parsed-receipt field mapping and its fixed CSV projection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key the orchestrator injects with the receipt's file name.
pub const FILE_KEY: &str = "File";

/// CSV header, in output order.
pub const CSV_HEADER: [&str; 7] = [
    "File",
    "Date",
    "Total",
    "Tax",
    "Payment Method",
    "Vendor",
    "Receipt Number",
];

/// Mapping keys feeding each CSV column, aligned with [`CSV_HEADER`].
pub const FIELD_KEYS: [&str; 7] = [
    FILE_KEY,
    "Date",
    "Total Amount",
    "Tax Amount",
    "Payment Method",
    "Vendor Name",
    "Receipt Number",
];

/// Field name → value, as returned by the model plus the injected `File`.
///
/// Key order carries no meaning; [`ParsedReceipt::to_row`] always projects
/// onto the fixed column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedReceipt {
    fields: HashMap<String, String>,
}

impl ParsedReceipt {
    /// An empty mapping; every column renders as `""`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Set the `File` column, replacing anything the model returned under it.
    pub fn set_file(&mut self, file_name: impl Into<String>) {
        self.insert(FILE_KEY, file_name);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Values in [`CSV_HEADER`] order, `""` for absent keys.
    pub fn to_row(&self) -> [&str; 7] {
        FIELD_KEYS.map(|k| self.get(k).unwrap_or(""))
    }
}

impl From<HashMap<String, String>> for ParsedReceipt {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParsedReceipt {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
