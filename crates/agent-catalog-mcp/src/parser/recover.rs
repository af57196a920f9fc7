//! Line-oriented recovery of headers that are not valid YAML.
//!
//! Agent files are often hand-written with an unquoted `description` that
//! wraps across several lines. YAML rejects that, so this module rebuilds the
//! fields one trimmed line at a time:
//!
//! - `key: value` lines set `key` (split at the first colon, so values may
//!   contain colons such as URLs).
//! - `description: ...` starts collecting; every following line that either
//!   has no colon or starts with a quote is appended to the description.
//! - The first colon-bearing line not starting with a quote ends collection
//!   and is itself stored as a field.
//!
//! The collected parts are joined with single spaces once all lines are seen.

use crate::model::{FieldMap, FieldValue};

const DESCRIPTION_KEY: &str = "description";

/// Where the recoverer is within the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    ScanningField,
    CollectingDescription,
}

/// Stateful header recoverer fed one line at a time.
#[derive(Debug, Clone)]
pub struct HeaderRecoverer {
    state: RecoveryState,
    description_parts: Vec<String>,
    fields: FieldMap,
}

impl Default for HeaderRecoverer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderRecoverer {
    pub fn new() -> Self {
        Self {
            state: RecoveryState::ScanningField,
            description_parts: Vec::new(),
            fields: FieldMap::new(),
        }
    }

    pub fn state(&self) -> RecoveryState {
        self.state
    }

    pub fn description_parts(&self) -> &[String] {
        &self.description_parts
    }

    /// Advance the machine by one header line.
    pub fn feed(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        match self.state {
            RecoveryState::CollectingDescription => {
                if starts_new_field(line) {
                    self.state = RecoveryState::ScanningField;
                    if let Some((key, value)) = split_field(line) {
                        self.fields.insert(key.to_string(), FieldValue::from(value));
                    }
                } else {
                    self.description_parts.push(line.to_string());
                }
            }
            RecoveryState::ScanningField => {
                let Some((key, value)) = split_field(line) else {
                    return;
                };
                if key == DESCRIPTION_KEY {
                    let value = strip_matching_quotes(value);
                    if !value.is_empty() {
                        self.description_parts.push(value.to_string());
                    }
                    self.state = RecoveryState::CollectingDescription;
                } else {
                    self.fields.insert(key.to_string(), FieldValue::from(value));
                }
            }
        }
    }

    /// Consume the machine and return the recovered fields.
    pub fn finish(mut self) -> FieldMap {
        if !self.description_parts.is_empty() {
            self.fields.insert(
                DESCRIPTION_KEY.to_string(),
                FieldValue::Text(self.description_parts.join(" ")),
            );
        }
        self.fields
    }
}

/// Recover fields from header lines. Never fails; missing required fields
/// are left for the record assembler to reject.
pub fn recover_fields<'a>(lines: impl IntoIterator<Item = &'a str>) -> FieldMap {
    let mut recoverer = HeaderRecoverer::new();
    for line in lines {
        recoverer.feed(line);
    }
    recoverer.finish()
}

/// A collecting line ends the description when it looks like `key: value`
/// and is not a quoted continuation.
fn starts_new_field(line: &str) -> bool {
    line.contains(':') && !line.starts_with('"') && !line.starts_with('\'')
}

fn split_field(line: &str) -> Option<(&str, &str)> {
    line.split_once(':')
        .map(|(key, value)| (key.trim(), value.trim()))
}

fn strip_matching_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
