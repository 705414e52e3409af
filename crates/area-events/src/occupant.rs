//! Occupant Records
//!
//! An `Occupant` is one agent's presence inside one area visit. It is opened
//! on entry, stamped with an exit time on leave, and never touched again
//! after that.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{AgentId, AreaId};
use crate::timestamp::Timestamp;

/// Directed edge "the occupant holding this entry can currently see `agent_id`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleEntry {
    pub agent_id: AgentId,
    /// When the edge was first established in the current visible-set
    pub added_at: Timestamp,
    /// Interaction score (history only, no novelty bonus) when the edge was selected
    pub interaction_score: f64,
}

impl VisibleEntry {
    pub fn new(agent_id: impl Into<AgentId>, added_at: Timestamp, interaction_score: f64) -> Self {
        Self {
            agent_id: agent_id.into(),
            added_at,
            interaction_score,
        }
    }
}

/// One agent's visit to one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupant {
    pub visit_id: Uuid,
    pub agent_id: AgentId,
    pub area_id: AreaId,
    pub entered_at: Timestamp,
    /// `None` while the agent is still present
    #[serde(default)]
    pub exited_at: Option<Timestamp>,
    #[serde(default)]
    pub activities: Vec<String>,
    /// Current visible-set, ordered as selected
    #[serde(default)]
    pub visible: Vec<VisibleEntry>,
    #[serde(default)]
    pub total_interactions: u32,
}

impl Occupant {
    /// Opens a new visit record with a fresh visit id.
    pub fn open(agent_id: impl Into<AgentId>, area_id: impl Into<AreaId>, entered_at: Timestamp) -> Self {
        Self {
            visit_id: Uuid::new_v4(),
            agent_id: agent_id.into(),
            area_id: area_id.into(),
            entered_at,
            exited_at: None,
            activities: Vec::new(),
            visible: Vec::new(),
            total_interactions: 0,
        }
    }

    pub fn is_present(&self) -> bool {
        self.exited_at.is_none()
    }

    /// Ids in the current visible-set, in selection order.
    pub fn visible_ids(&self) -> Vec<AgentId> {
        self.visible.iter().map(|e| e.agent_id.clone()).collect()
    }

    pub fn can_see(&self, agent_id: &AgentId) -> bool {
        self.visible.iter().any(|e| &e.agent_id == agent_id)
    }

    /// Looks up the visible entry for `agent_id`.
    pub fn visible_entry(&self, agent_id: &AgentId) -> Option<&VisibleEntry> {
        self.visible.iter().find(|e| &e.agent_id == agent_id)
    }

    /// Length of the visit so far (or in total once closed).
    pub fn duration_millis(&self, now: Timestamp) -> u64 {
        self.exited_at.unwrap_or(now).millis_since(self.entered_at)
    }
}
