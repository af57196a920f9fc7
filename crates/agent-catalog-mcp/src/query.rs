//! Filtering of parsed agent records.

use crate::model::{AgentFilters, AgentRecord};

/// Whether `record` satisfies every supplied criterion in `filters`.
pub fn matches(record: &AgentRecord, filters: &AgentFilters) -> bool {
    if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&needle);
        let found = hit(&record.name)
            || hit(&record.description)
            || hit(&record.system_prompt)
            || record.tools.iter().any(|t| hit(t));
        if !found {
            return false;
        }
    }

    if let Some(color) = filters.color.as_deref().filter(|c| !c.is_empty())
        && record.color != color
    {
        return false;
    }

    if let Some(tools) = filters.tools.as_ref().filter(|t| !t.is_empty())
        && !tools.iter().any(|t| record.tools.contains(t))
    {
        return false;
    }

    true
}

/// Keep the records matching `filters`, preserving input order.
pub fn filter_agents(records: Vec<AgentRecord>, filters: &AgentFilters) -> Vec<AgentRecord> {
    if filters.is_empty() {
        return records;
    }
    records.into_iter().filter(|r| matches(r, filters)).collect()
}
