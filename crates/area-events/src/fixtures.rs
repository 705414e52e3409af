//! Sample data fixtures for testing.
//!
//! This module provides ready-made test data for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // area-events = { path = "../area-events", features = ["test-fixtures"] }
//!
//! use area_events::fixtures;
//!
//! let area = fixtures::test_plaza(10, 2);
//! let occupants = fixtures::occupants_entering(&area, &[("a", 0), ("b", 1)]);
//! ```

use crate::{
    AgentId, Area, AreaFacility, AreaType, InteractionKind, InteractionRecord, Occupant, Timestamp,
};

/// A small active plaza with the given hard capacity and visibility cap.
pub fn test_plaza(capacity: usize, max_visible: usize) -> Area {
    Area::new("test-plaza", "Test Plaza", AreaType::Plaza, capacity)
        .with_description("Fixture plaza")
        .with_position(50, 50)
        .with_max_visible(max_visible)
        .with_facility(AreaFacility::new("fountain", "Fountain", "decoration", 0, 0))
}

/// A cafe with default visibility and room for 20.
pub fn test_cafe() -> Area {
    Area::new("test-cafe", "Test Cafe", AreaType::Cafe, 20).with_position(45, 48)
}

/// Zero-padded agent id, e.g. `agent_007`.
pub fn agent(n: usize) -> AgentId {
    AgentId(format!("agent_{:03}", n))
}

/// Open occupants of `area`, one per `(agent, entered_at_millis)` pair.
pub fn occupants_entering(area: &Area, entries: &[(&str, u64)]) -> Vec<Occupant> {
    entries
        .iter()
        .map(|(agent, at)| Occupant::open(*agent, area.id.clone(), Timestamp::from_millis(*at)))
        .collect()
}

/// `count` identical interactions with `with`, all stamped `at`.
pub fn interactions(with: &str, kind: InteractionKind, count: usize, at: Timestamp) -> Vec<InteractionRecord> {
    (0..count)
        .map(|_| InteractionRecord::new(kind.clone(), with, at))
        .collect()
}
