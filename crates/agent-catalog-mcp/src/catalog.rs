//! File-backed agent catalog.
//!
//! Responsibilities:
//! - Enumerate definition files in the agents directory.
//! - Read and parse them concurrently, dropping documents that do not parse.
//! - Answer "list matching filters" and "fetch one by id" requests.
//!
//! Nothing is cached; every request reads the directory again.

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;

use crate::error::{CatalogError, Result};
use crate::model::{
    AgentFilters, AgentRecord, AgentsResponse, DEFAULT_EXTENSION, filename_for_id,
};
use crate::parser::AgentDocumentParser;
use crate::query::filter_agents;

/// Message attached to listings when the agents directory cannot be read.
pub const SOURCE_UNAVAILABLE_MESSAGE: &str = "Unable to read agents directory";

/// Where agent definitions live and how they are named.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    /// Directory scanned for definition files (not recursive).
    pub agents_dir: PathBuf,
    /// Filename suffix of definition files, stripped to form record ids.
    pub extension: String,
}

impl CatalogSettings {
    pub fn new(agents_dir: PathBuf) -> Self {
        Self {
            agents_dir,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Read-only view over the agents directory.
#[derive(Debug, Clone)]
pub struct Catalog {
    settings: CatalogSettings,
    parser: AgentDocumentParser,
}

impl Catalog {
    pub fn new(settings: CatalogSettings) -> Self {
        let parser = AgentDocumentParser::new(settings.extension.clone());
        Self { settings, parser }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Parse every definition in the agents directory.
    ///
    /// Records come back in filename order. Unreadable or unparsable files
    /// are skipped; only a directory that cannot be listed is an error.
    pub async fn load_all(&self) -> Result<Vec<AgentRecord>> {
        let files = self.definition_files().await?;
        tracing::debug!(
            "parsing {} definition file(s) from {}",
            files.len(),
            self.settings.agents_dir.display()
        );

        let mut set = JoinSet::new();
        for (idx, (filename, path)) in files.iter().cloned().enumerate() {
            let parser = self.parser.clone();
            set.spawn(async move {
                let record = match tokio::fs::read_to_string(&path).await {
                    Ok(content) => parser.parse(&filename, &content),
                    Err(e) => {
                        tracing::warn!("skipping {}: failed to read: {}", path.display(), e);
                        None
                    }
                };
                (idx, record)
            });
        }

        let mut slots: Vec<Option<AgentRecord>> = vec![None; files.len()];
        while let Some(res) = set.join_next().await {
            match res {
                Ok((idx, record)) => slots[idx] = record,
                Err(e) => {
                    tracing::error!("agent parse task failed: {}", e);
                    return Err(CatalogError::Internal(e.to_string()));
                }
            }
        }
        let records: Vec<AgentRecord> = slots.into_iter().flatten().collect();
        tracing::debug!(
            "parsed {}/{} definition file(s)",
            records.len(),
            files.len()
        );
        Ok(records)
    }

    /// List records matching `filters`.
    ///
    /// An unreadable agents directory produces an empty listing carrying an
    /// error message instead of failing.
    pub async fn list(&self, filters: AgentFilters) -> Result<AgentsResponse> {
        match self.load_all().await {
            Ok(records) => {
                let agents = filter_agents(records, &filters);
                Ok(AgentsResponse::new(agents, filters))
            }
            Err(e @ CatalogError::SourceUnavailable { .. }) => {
                tracing::warn!("{}", e);
                Ok(AgentsResponse::unavailable(
                    filters,
                    SOURCE_UNAVAILABLE_MESSAGE,
                ))
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch a single record by id.
    pub async fn get(&self, id: &str) -> Result<AgentRecord> {
        let not_found = || CatalogError::NotFound(id.to_string());
        let Some(filename) = filename_for_id(id, &self.settings.extension) else {
            tracing::debug!("rejecting agent id {:?}", id);
            return Err(not_found());
        };
        let path = self.settings.agents_dir.join(&filename);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            tracing::debug!("cannot read {}: {}", path.display(), e);
            not_found()
        })?;
        self.parser.parse(&filename, &content).ok_or_else(not_found)
    }

    /// Definition files in the agents directory, sorted by filename.
    async fn definition_files(&self) -> Result<Vec<(String, PathBuf)>> {
        let dir = &self.settings.agents_dir;
        let mut entries =
            tokio::fs::read_dir(dir)
                .await
                .map_err(|source| CatalogError::SourceUnavailable {
                    path: dir.clone(),
                    source,
                })?;

        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("stopped listing {}: {}", dir.display(), e);
                    break;
                }
            };
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !self.parser.supports(&filename) {
                continue;
            }
            let path = entry.path();
            if !is_file(&path).await {
                continue;
            }
            files.push((filename, path));
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
