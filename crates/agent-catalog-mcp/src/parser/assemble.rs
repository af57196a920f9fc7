//! Normalize decoded header fields into an [`AgentRecord`].

use crate::model::{AgentRecord, DEFAULT_COLOR, FieldMap, FieldValue, record_id};

/// Build a record from decoded fields and the document body.
///
/// Returns `None` when `name` or `description` is missing, empty, or not a
/// scalar. Nothing else is validated.
pub fn assemble_record(
    fields: &FieldMap,
    body: &str,
    filename: &str,
    extension: &str,
) -> Option<AgentRecord> {
    let name = required_text(fields, "name")?;
    let description = required_text(fields, "description")?;

    let color = fields
        .get("color")
        .and_then(FieldValue::as_text)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COLOR);

    Some(AgentRecord {
        id: record_id(filename, extension),
        name: name.to_string(),
        description: description.to_string(),
        tools: coerce_tools(fields.get("tools")),
        color: color.to_string(),
        system_prompt: body.trim().to_string(),
        filename: filename.to_string(),
    })
}

fn required_text<'a>(fields: &'a FieldMap, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(FieldValue::as_text)
        .filter(|s| !s.is_empty())
}

/// Lists pass through untouched; scalars split on commas with each piece
/// trimmed. Empty pieces are kept, so `"Read,"` yields `["Read", ""]`.
fn coerce_tools(value: Option<&FieldValue>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(FieldValue::List(items)) => items.clone(),
        Some(FieldValue::Text(s)) if s.is_empty() => Vec::new(),
        Some(FieldValue::Text(s)) => s.split(',').map(|t| t.trim().to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, FieldValue)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn builds_record_with_defaults() {
        let f = fields(&[("name", "A".into()), ("description", "B".into())]);
        let rec = assemble_record(&f, "\n  prompt  \n", "a.md", ".md").expect("record");
        assert_eq!(rec.id, "a");
        assert_eq!(rec.filename, "a.md");
        assert!(rec.tools.is_empty());
        assert_eq!(rec.color, "gray");
        assert_eq!(rec.system_prompt, "prompt");
    }

    #[test]
    fn splits_scalar_tools_and_passes_lists_through() {
        let f = fields(&[
            ("name", "A".into()),
            ("description", "B".into()),
            ("tools", " Read ,Write,  Bash".into()),
        ]);
        let rec = assemble_record(&f, "", "a.md", ".md").expect("record");
        assert_eq!(rec.tools, vec!["Read", "Write", "Bash"]);

        let f = fields(&[
            ("name", "A".into()),
            ("description", "B".into()),
            ("tools", vec![" Read ".to_string(), "Write".to_string()].into()),
        ]);
        let rec = assemble_record(&f, "", "a.md", ".md").expect("record");
        assert_eq!(rec.tools, vec![" Read ", "Write"]);
    }

    // Known quirk kept on purpose: a trailing comma produces an empty tool name.
    #[test]
    fn trailing_comma_yields_empty_tool_entry() {
        let f = fields(&[
            ("name", "A".into()),
            ("description", "B".into()),
            ("tools", "Read, Write,".into()),
        ]);
        let rec = assemble_record(&f, "", "a.md", ".md").expect("record");
        assert_eq!(rec.tools, vec!["Read", "Write", ""]);
    }

    #[test]
    fn empty_scalar_tools_and_color_fall_back_to_defaults() {
        let f = fields(&[
            ("name", "A".into()),
            ("description", "B".into()),
            ("tools", "".into()),
            ("color", "".into()),
        ]);
        let rec = assemble_record(&f, "", "a.md", ".md").expect("record");
        assert!(rec.tools.is_empty());
        assert_eq!(rec.color, "gray");
    }

    #[test]
    fn unknown_color_is_preserved() {
        let f = fields(&[
            ("name", "A".into()),
            ("description", "B".into()),
            ("color", "Chartreuse".into()),
        ]);
        let rec = assemble_record(&f, "", "a.md", ".md").expect("record");
        assert_eq!(rec.color, "Chartreuse");
    }

    #[test]
    fn rejects_missing_or_empty_required_fields() {
        let no_desc = fields(&[("name", "A".into())]);
        assert!(assemble_record(&no_desc, "", "a.md", ".md").is_none());

        let empty_name = fields(&[("name", "".into()), ("description", "B".into())]);
        assert!(assemble_record(&empty_name, "", "a.md", ".md").is_none());

        let list_name = fields(&[
            ("name", vec!["A".to_string()].into()),
            ("description", "B".into()),
        ]);
        assert!(assemble_record(&list_name, "", "a.md", ".md").is_none());
    }
}
