//! Catalog of agent definition files.
//!
//! Agent definitions are Markdown documents with a `---` delimited metadata
//! header (`name`, `description`, `tools`, `color`) followed by the agent's
//! instructions. This crate parses them, tolerating the common hand-written
//! header mistakes that strict YAML rejects, and answers listing and lookup
//! queries over a directory of them. The binary serves the catalog over MCP.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handler;
pub mod model;
pub mod parser;
pub mod query;

pub use catalog::{Catalog, CatalogSettings};
pub use error::CatalogError;
pub use model::{AgentFilters, AgentRecord, AgentsResponse};
pub use parser::{AgentDocumentParser, parse_agent_document};
