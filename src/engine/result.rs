//! Stage result types

use serde_json::Value;

/// Output of one remote stage. Produced once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum StageResult {
    /// Displayable text (summaries, generated source, confirmations)
    Text(String),
    /// Structured data consumed by a later stage or shown as a report
    Json(Value),
    /// Binary artifact destined for local persistence
    Binary(Vec<u8>),
}

impl StageResult {
    pub fn kind(&self) -> &'static str {
        match self {
            StageResult::Text(_) => "text",
            StageResult::Json(_) => "json",
            StageResult::Binary(_) => "binary",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StageResult::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            StageResult::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            StageResult::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Human-readable rendering: text as-is, JSON pretty-printed
    pub fn display(&self) -> String {
        match self {
            StageResult::Text(text) => text.clone(),
            StageResult::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            StageResult::Binary(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}
