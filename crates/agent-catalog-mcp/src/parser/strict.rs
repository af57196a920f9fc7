//! Strict YAML decoding of a document header.

use serde_yaml::Value as YamlValue;

use crate::model::{FieldMap, FieldValue};

/// Outcome of the strict decoding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrictOutcome {
    /// Header is valid YAML with a non-empty `name` and `description`.
    Decoded(FieldMap),
    /// Header could not be used as-is; try the line recoverer.
    NeedsFallback,
}

/// Decode `header` as a YAML mapping.
///
/// Syntax errors, non-mapping documents, and maps missing a required field
/// all yield [`StrictOutcome::NeedsFallback`].
pub fn decode_strict(header: &str) -> StrictOutcome {
    let value: YamlValue = match serde_yaml::from_str(header) {
        Ok(v) => v,
        Err(e) => {
            tracing::trace!("strict header decode failed: {}", e);
            return StrictOutcome::NeedsFallback;
        }
    };
    let YamlValue::Mapping(mapping) = value else {
        return StrictOutcome::NeedsFallback;
    };

    let mut fields = FieldMap::new();
    for (key, val) in mapping {
        let Some(key) = scalar_to_string(&key) else {
            continue;
        };
        if let Some(field) = to_field_value(val) {
            fields.insert(key, field);
        }
    }

    if has_required(&fields) {
        StrictOutcome::Decoded(fields)
    } else {
        StrictOutcome::NeedsFallback
    }
}

fn has_required(fields: &FieldMap) -> bool {
    ["name", "description"].iter().all(|k| {
        fields
            .get(*k)
            .and_then(FieldValue::as_text)
            .is_some_and(|s| !s.is_empty())
    })
}

fn to_field_value(value: YamlValue) -> Option<FieldValue> {
    match value {
        YamlValue::Sequence(items) => Some(FieldValue::List(
            items.iter().filter_map(scalar_to_string).collect(),
        )),
        YamlValue::Tagged(tagged) => to_field_value(tagged.value),
        other => scalar_to_string(&other).map(FieldValue::Text),
    }
}

fn scalar_to_string(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
