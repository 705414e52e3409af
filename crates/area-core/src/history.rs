//! Interaction History Store
//!
//! Rolling, per-agent interaction history shared by every area. Each agent's
//! list sits behind its own shard lock, so recording an interaction in one
//! area never waits on unrelated agents elsewhere.

use area_events::{AgentId, InteractionKind, InteractionRecord, Timestamp};
use dashmap::DashMap;
use std::collections::{BTreeMap, VecDeque};
use tracing::trace;

/// Bounded per-agent interaction lists.
///
/// Oldest entries are evicted once an agent's list exceeds the cap; age-based
/// decay is the score model's job, not this store's.
#[derive(Debug)]
pub struct InteractionHistory {
    entries: DashMap<AgentId, VecDeque<InteractionRecord>>,
    max_entries_per_agent: usize,
}

impl InteractionHistory {
    pub fn new(max_entries_per_agent: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries_per_agent: max_entries_per_agent.max(1),
        }
    }

    pub fn max_entries_per_agent(&self) -> usize {
        self.max_entries_per_agent
    }

    /// Appends one record to each participant's list.
    ///
    /// Both copies share kind and timestamp; each names the other participant.
    /// Returns `false` (and stores nothing) when both ids are the same agent.
    pub fn record(&self, a: &AgentId, b: &AgentId, kind: InteractionKind, now: Timestamp) -> bool {
        if a == b {
            return false;
        }
        self.push(a, InteractionRecord::new(kind.clone(), b.clone(), now));
        self.push(b, InteractionRecord::new(kind, a.clone(), now));
        trace!(agent_a = %a, agent_b = %b, "recorded interaction");
        true
    }

    // One shard guard at a time: a and b may hash to the same shard.
    fn push(&self, agent: &AgentId, record: InteractionRecord) {
        let mut list = self.entries.entry(agent.clone()).or_default();
        list.push_back(record);
        while list.len() > self.max_entries_per_agent {
            list.pop_front();
        }
    }

    /// Copy of an agent's full history, oldest first.
    pub fn history_of(&self, agent: &AgentId) -> Vec<InteractionRecord> {
        self.entries
            .get(agent)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Records of `agent` whose counterpart is `other`.
    pub fn shared(&self, agent: &AgentId, other: &AgentId) -> Vec<InteractionRecord> {
        self.entries
            .get(agent)
            .map(|list| list.iter().filter(|r| &r.with == other).cloned().collect())
            .unwrap_or_default()
    }

    pub fn len_of(&self, agent: &AgentId) -> usize {
        self.entries.get(agent).map(|list| list.len()).unwrap_or(0)
    }

    /// Number of agents with any history.
    pub fn agent_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every list.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Ordered copy of every list, for persistence.
    pub fn export(&self) -> BTreeMap<AgentId, Vec<InteractionRecord>> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().iter().cloned().collect()))
            .collect()
    }

    /// Replaces the store's contents, truncating each list to the cap.
    pub fn import(&self, histories: BTreeMap<AgentId, Vec<InteractionRecord>>) {
        self.entries.clear();
        for (agent, records) in histories {
            let skip = records.len().saturating_sub(self.max_entries_per_agent);
            let list: VecDeque<_> = records.into_iter().skip(skip).collect();
            self.entries.insert(agent, list);
        }
    }
}

impl Default for InteractionHistory {
    fn default() -> Self {
        Self::new(100)
    }
}
