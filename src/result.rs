// src/result.rs

//! The worker's result protocol.
//!
//! The worker may print any number of diagnostic lines. Its last non-blank
//! stdout line must be a single-line JSON object:
//!
//! ```text
//! {"status": "success" | "error", "message": "<text>"}
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{BridgeError, Result};
use crate::types::OutputBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// Outcome reported by the worker on its final output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDocument {
    pub status: ResultStatus,
    pub message: String,
}

impl ResultDocument {
    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}

/// Parse the result document out of captured stdout.
///
/// Only the last non-blank line counts; anything before it, including
/// earlier JSON-looking lines, is ignored.
pub fn parse_result(buffer: &OutputBuffer) -> Result<ResultDocument> {
    let line = last_non_blank_line(buffer).ok_or(BridgeError::EmptyOutput)?;
    parse_result_line(line)
}

fn last_non_blank_line(buffer: &OutputBuffer) -> Option<&str> {
    buffer
        .lines()
        .iter()
        .rev()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
}

/// Parse one line as a result document.
pub fn parse_result_line(line: &str) -> Result<ResultDocument> {
    let malformed = |reason: String| BridgeError::MalformedResult {
        line: line.to_string(),
        reason,
    };

    let value: Value = serde_json::from_str(line).map_err(|e| malformed(e.to_string()))?;
    let obj = value
        .as_object()
        .ok_or_else(|| malformed("expected a JSON object".to_string()))?;

    let status = string_field(obj, "status").map_err(malformed)?;
    let message = string_field(obj, "message").map_err(malformed)?;

    let status = match status {
        "success" => ResultStatus::Success,
        "error" => ResultStatus::Error,
        other => {
            return Err(malformed(format!(
                "unknown status {other:?} (expected \"success\" or \"error\")"
            )));
        }
    };

    Ok(ResultDocument {
        status,
        message: message.to_string(),
    })
}

fn string_field<'a>(
    obj: &'a serde_json::Map<String, Value>,
    key: &str,
) -> std::result::Result<&'a str, String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(format!("field `{key}` must be a string, got {other}")),
        None => Err(format!("missing field `{key}`")),
    }
}
