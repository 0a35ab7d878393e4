//! Post-processing of the model's message content into a field mapping.
//!
//! Models are asked for bare JSON but regularly wrap it in a Markdown fence
//! (```` ```json … ``` ````). The fence is removed before parsing. Values are
//! then flattened to strings, since the CSV writer only deals in text.

use crate::error::CompletionError;
use crate::record::ParsedReceipt;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Fenced replies are unwrapped on purpose. Plain JSON decoding of the raw
// content would reject them and leave the row empty.
static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\s*\n(.*?)\n?```\s*$").unwrap());

/// Strip one outer code fence, if the whole content is fenced.
pub fn strip_code_fences(input: &str) -> &str {
    let trimmed = input.trim();
    match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps.get(1).map_or(trimmed, |m| m.as_str()),
        None => trimmed,
    }
}

/// Render a JSON value as CSV cell text.
///
/// Strings verbatim, `null` as empty, everything else as compact JSON.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse the model's message content into a [`ParsedReceipt`].
///
/// The content must be a JSON object (optionally fenced).
pub fn parse_fields(content: &str) -> Result<ParsedReceipt, CompletionError> {
    let body = strip_code_fences(content);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| CompletionError::Decode(format!("model output is not JSON: {e}")))?;

    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.as_str(), stringify_value(v)))
            .collect()),
        other => Err(CompletionError::Decode(format!(
            "model output is JSON but not an object: {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
