//! Identifier helpers tying record ids to source filenames.

/// Default suffix of agent definition files.
pub const DEFAULT_EXTENSION: &str = ".md";

/// Derive a record id by removing `extension` from the end of `filename`.
///
/// Filenames that do not end with `extension` are returned unchanged.
pub fn record_id(filename: &str, extension: &str) -> String {
    filename
        .strip_suffix(extension)
        .unwrap_or(filename)
        .to_string()
}

/// Build the source filename for a record id.
///
/// Returns `None` for ids that could escape the source directory or are
/// empty, so lookups never touch paths outside of it.
pub fn filename_for_id(id: &str, extension: &str) -> Option<String> {
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains('/')
        || id.contains('\\')
        || id.contains('\0')
    {
        return None;
    }
    Some(format!("{}{}", id, extension))
}
