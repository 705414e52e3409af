//! Snapshot Types
//!
//! Serialization structs for handing presence state to a persistence layer
//! and reading it back after a restart.
//!
//! Everything here must round-trip losslessly: a visible entry that comes
//! back with a different `added_at` would look like a brand-new edge to the
//! client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::area::Area;
use crate::ids::AgentId;
use crate::interaction::InteractionRecord;
use crate::occupant::Occupant;
use crate::tally::VisitTally;
use crate::timestamp::Timestamp;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// One area with its open visits and closed-visit totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSnapshot {
    pub area: Area,
    /// Currently present occupants, oldest entry first
    #[serde(default)]
    pub open: Vec<Occupant>,
    #[serde(default)]
    pub tally: VisitTally,
}

impl AreaSnapshot {
    pub fn occupancy(&self) -> usize {
        self.open.len()
    }
}

/// Complete presence state of one service instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    pub snapshot_id: String,
    pub taken_at: Timestamp,
    pub areas: Vec<AreaSnapshot>,
    /// Per-agent interaction history, oldest first
    #[serde(default)]
    pub histories: BTreeMap<AgentId, Vec<InteractionRecord>>,
}

impl PresenceSnapshot {
    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Total number of agents currently present across all areas.
    pub fn total_present(&self) -> usize {
        self.areas.iter().map(AreaSnapshot::occupancy).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaType;
    use crate::occupant::VisibleEntry;

    #[test]
    fn test_snapshot_id_format() {
        assert_eq!(generate_snapshot_id(7), "snap_000007");
    }

    #[test]
    fn test_visible_entries_survive_json() {
        let mut a = Occupant::open("agent_a", "park-green", Timestamp::from_millis(10));
        a.visible.push(VisibleEntry::new("agent_b", Timestamp::from_millis(12), 2.75));
        let b = Occupant::open("agent_b", "park-green", Timestamp::from_millis(11));

        let snapshot = PresenceSnapshot {
            snapshot_id: generate_snapshot_id(1),
            taken_at: Timestamp::from_millis(20),
            areas: vec![AreaSnapshot {
                area: Area::new("park-green", "Green Park", AreaType::Park, 30),
                open: vec![a.clone(), b],
                tally: VisitTally::default(),
            }],
            histories: BTreeMap::new(),
        };

        let parsed = PresenceSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.total_present(), 2);
        assert_eq!(parsed.areas[0].open[0].visible[0].added_at, Timestamp::from_millis(12));
        assert_eq!(parsed.areas[0].open[0].visit_id, a.visit_id);
    }
}
