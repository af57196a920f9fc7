//! Agent definition parsing.
//!
//! A document is split into a `---` delimited header and a body. The header
//! is decoded strictly as YAML first; when that is not usable the line
//! recoverer rebuilds the fields instead. Either way the fields are then
//! assembled into an [`AgentRecord`]. Both the single-record and the listing
//! paths go through [`AgentDocumentParser::parse`].

pub mod assemble;
pub mod recover;
pub mod split;
pub mod strict;

use crate::model::{AgentRecord, DEFAULT_EXTENSION, FieldMap};

pub use assemble::assemble_record;
pub use recover::{HeaderRecoverer, RecoveryState, recover_fields};
pub use split::{HeaderBody, split_header};
pub use strict::{StrictOutcome, decode_strict};

/// Which decoder produced the header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePath {
    Strict,
    Recovered,
}

/// Decode a split header, falling back to line recovery when strict YAML
/// decoding does not yield the required fields.
pub fn decode_header(header: &HeaderBody<'_>) -> (FieldMap, DecodePath) {
    match decode_strict(header.header()) {
        StrictOutcome::Decoded(fields) => (fields, DecodePath::Strict),
        StrictOutcome::NeedsFallback => (
            recover_fields(header.header_lines()),
            DecodePath::Recovered,
        ),
    }
}

/// Parser for agent definition files sharing one extension suffix.
#[derive(Debug, Clone)]
pub struct AgentDocumentParser {
    extension: String,
}

impl Default for AgentDocumentParser {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl AgentDocumentParser {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether `filename` carries the configured extension.
    pub fn supports(&self, filename: &str) -> bool {
        filename.ends_with(&self.extension)
    }

    /// Parse one document. Returns `None` when the header is missing or no
    /// decoder yields a non-empty `name` and `description`.
    pub fn parse(&self, filename: &str, content: &str) -> Option<AgentRecord> {
        let Some(header) = split_header(content) else {
            tracing::debug!("{}: no '---' delimited header at start of file", filename);
            return None;
        };
        let (fields, path) = decode_header(&header);
        let record = assemble_record(&fields, header.body(), filename, &self.extension);
        match &record {
            Some(rec) => tracing::trace!("{}: parsed '{}' via {:?} path", filename, rec.name, path),
            None => tracing::debug!(
                "{}: header lacks a non-empty name or description ({:?} path)",
                filename,
                path
            ),
        }
        record
    }
}

/// Parse one document with the default `.md` suffix.
pub fn parse_agent_document(filename: &str, content: &str) -> Option<AgentRecord> {
    AgentDocumentParser::default().parse(filename, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn well_formed_document_takes_strict_path() {
        let doc = "---\nname: Reviewer\ndescription: Reviews code\ntools: Read, Write\ncolor: blue\n---\nYou review code.";
        let header = split_header(doc).expect("header");
        let (_, path) = decode_header(&header);
        assert_eq!(path, DecodePath::Strict);

        let rec = parse_agent_document("code-reviewer.md", doc).expect("record");
        assert_eq!(
            rec,
            AgentRecord {
                id: "code-reviewer".into(),
                name: "Reviewer".into(),
                description: "Reviews code".into(),
                tools: vec!["Read".into(), "Write".into()],
                color: "blue".into(),
                system_prompt: "You review code.".into(),
                filename: "code-reviewer.md".into(),
            }
        );
    }

    #[test]
    fn multiline_description_takes_recovery_path() {
        let doc = "---\nname: Refactorer\ndescription: This agent helps\nwith refactoring\nand testing.\ntools: Bash\n---\nBody";
        let header = split_header(doc).expect("header");
        let (_, path) = decode_header(&header);
        assert_eq!(path, DecodePath::Recovered);

        let rec = parse_agent_document("refactorer.md", doc).expect("record");
        assert_eq!(rec.description, "This agent helps with refactoring and testing.");
        assert_eq!(rec.tools, vec!["Bash"]);
        assert_eq!(rec.name, "Refactorer");
        assert_eq!(rec.system_prompt, "Body");
    }

    #[test]
    fn strict_yaml_without_description_still_gets_recovery_attempt() {
        // Valid YAML but `description` is absent: recovery runs and also fails.
        let doc = "---\nname: Lonely\ntools: Read\n---\nbody\n";
        assert!(parse_agent_document("lonely.md", doc).is_none());
    }

    #[test]
    fn recovery_handles_yaml_breaking_description_colons() {
        // `key: value: more` is invalid YAML; recovery splits at the first colon.
        let doc = "---\nname: Api\ndescription: Calls APIs: REST and gRPC\n---\nbody\n";
        let rec = parse_agent_document("api.md", doc).expect("record");
        assert_eq!(rec.description, "Calls APIs: REST and gRPC");
    }

    #[test]
    fn missing_header_yields_no_record() {
        assert!(parse_agent_document("plain.md", "# Just markdown\n").is_none());
        assert!(parse_agent_document("lead.md", "\n---\nname: A\ndescription: B\n---\nx").is_none());
    }

    #[test]
    fn header_closed_on_last_line_without_body() {
        let rec = parse_agent_document("a.md", "---\nname: A\ndescription: B\n---").expect("record");
        assert_eq!(rec.name, "A");
        assert_eq!(rec.description, "B");
        assert_eq!(rec.system_prompt, "");
    }

    #[test]
    fn yaml_list_tools_pass_through() {
        let doc = "---\nname: A\ndescription: B\ntools:\n  - Read\n  - Grep\n---\n";
        let rec = parse_agent_document("a.md", doc).expect("record");
        assert_eq!(rec.tools, vec!["Read", "Grep"]);
        assert_eq!(rec.system_prompt, "");
    }

    #[test]
    fn custom_extension_controls_ids_and_support() {
        let parser = AgentDocumentParser::new(".agent.md");
        assert_eq!(parser.extension(), ".agent.md");
        assert!(parser.supports("x.agent.md"));
        assert!(!parser.supports("x.md"));
        let rec = parser
            .parse("x.agent.md", "---\nname: X\ndescription: Y\n---\nbody\n")
            .expect("record");
        assert_eq!(rec.id, "x");
    }

    fn line_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z ]{0,20}[a-z]"
    }

    proptest! {
        #[test]
        fn continuation_lines_join_with_single_spaces(
            lines in prop::collection::vec(line_strategy(), 2..6)
        ) {
            let mut doc = format!("---\nname: Prop\ndescription: {}\n", lines[0]);
            for l in &lines[1..] {
                doc.push_str(l);
                doc.push('\n');
            }
            doc.push_str("color: red\n---\nbody\n");
            let rec = parse_agent_document("prop.md", &doc).expect("record");
            prop_assert_eq!(rec.description, lines.join(" "));
            prop_assert_eq!(rec.color, "red");
        }

        #[test]
        fn parsing_is_idempotent(content in "(---\n)?[a-z: \n'\"-]{0,120}(---\n)?[a-z ]{0,20}") {
            let first = parse_agent_document("same.md", &content);
            let second = parse_agent_document("same.md", &content);
            prop_assert_eq!(first, second);
        }
    }
}
