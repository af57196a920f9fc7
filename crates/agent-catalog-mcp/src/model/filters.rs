//! Query filters and response envelopes for catalog listings.

use serde::{Deserialize, Serialize};

use super::types::AgentRecord;

/// Criteria for narrowing a listing. Absent criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
}

impl AgentFilters {
    /// Build filters from flat query parameters.
    ///
    /// Empty strings count as absent. `tools` is a comma-separated list whose
    /// empty pieces are dropped; pieces are otherwise kept verbatim.
    pub fn from_query(search: Option<&str>, color: Option<&str>, tools: Option<&str>) -> Self {
        let non_empty = |s: Option<&str>| s.filter(|v| !v.is_empty()).map(str::to_string);
        let tools = tools
            .map(|s| {
                s.split(',')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty());
        Self {
            search: non_empty(search),
            color: non_empty(color),
            tools,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.as_deref().is_none_or(str::is_empty)
            && self.color.as_deref().is_none_or(str::is_empty)
            && self.tools.as_ref().is_none_or(Vec::is_empty)
    }
}

/// Result of a listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentsResponse {
    pub agents: Vec<AgentRecord>,
    pub total: usize,
    pub filters: AgentFilters,
    /// Set only when the source collection could not be enumerated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentsResponse {
    pub fn new(agents: Vec<AgentRecord>, filters: AgentFilters) -> Self {
        Self {
            total: agents.len(),
            agents,
            filters,
            error: None,
        }
    }

    /// Empty listing flagged with a source failure message.
    pub fn unavailable(filters: AgentFilters, message: impl Into<String>) -> Self {
        Self {
            agents: Vec::new(),
            total: 0,
            filters,
            error: Some(message.into()),
        }
    }
}

/// Result of a single-record fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent: AgentRecord,
}
