use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Color assigned to records whose header omits `color`.
pub const DEFAULT_COLOR: &str = "gray";

/// A parsed, validated agent definition.
///
/// Only ever built by the record assembler from a field map holding a
/// non-empty `name` and `description`; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    /// Source filename with its extension suffix removed.
    pub id: String,
    pub name: String,
    /// May be reconstructed from several header lines joined by single spaces.
    pub description: String,
    /// Tool names in header order; empty when the header has no `tools`.
    pub tools: Vec<String>,
    /// Free-form color hint; unknown values are preserved as-is.
    pub color: String,
    /// Document body after the header, trimmed.
    pub system_prompt: String,
    /// Original source filename.
    pub filename: String,
}

/// A single decoded header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Borrow the scalar form, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::List(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        FieldValue::List(v)
    }
}

/// Header fields keyed by name, as produced by either decoder.
pub type FieldMap = HashMap<String, FieldValue>;
