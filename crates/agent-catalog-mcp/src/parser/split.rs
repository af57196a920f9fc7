//! Split a document into its `---` delimited header and the body after it.

/// Header text and trimmed body of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderBody<'a> {
    header: &'a str,
    body: &'a str,
}

impl<'a> HeaderBody<'a> {
    /// Raw header text between the delimiter lines.
    pub fn header(&self) -> &'a str {
        self.header
    }

    /// Header lines in order, without line terminators.
    pub fn header_lines(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.header.lines()
    }

    /// Body text with surrounding whitespace removed.
    pub fn body(&self) -> &'a str {
        self.body
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Locate the header block at the very start of `content`.
///
/// The first line must be `---` (trailing whitespace allowed) followed by a
/// line break; the header runs up to the first later `---` line, which may
/// end the text. Leading blank lines are not skipped. Returns `None` when the pattern does
/// not match.
pub fn split_header(content: &str) -> Option<HeaderBody<'_>> {
    let mut lines = content.split_inclusive('\n');
    let opening = lines.next()?;
    if !opening.ends_with('\n') || !is_delimiter(opening) {
        return None;
    }

    let header_start = opening.len();
    let mut offset = header_start;
    for line in lines {
        // A delimiter right after the opening one belongs to the header.
        if offset > header_start && is_delimiter(line) {
            let header = content[header_start..offset]
                .strip_suffix('\n')
                .map(|h| h.strip_suffix('\r').unwrap_or(h))
                .unwrap_or(&content[header_start..offset]);
            let body = content[offset + line.len()..].trim();
            return Some(HeaderBody { header, body });
        }
        offset += line.len();
    }
    None
}
