use std::path::PathBuf;

/// Failures surfaced by the catalog to its callers.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No parsable definition exists for the requested id.
    #[error("agent '{0}' not found")]
    NotFound(String),

    /// The source directory could not be enumerated.
    #[error("unable to read agents directory {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
