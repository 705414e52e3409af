//! Shared presence types and serialization for public-area visibility.
//!
//! This crate contains pure data structures with no presence or scoring
//! logic. It is a dependency for all other crates in the workspace.

pub mod area;
pub mod ids;
pub mod interaction;
pub mod occupant;
pub mod snapshot;
pub mod tally;
pub mod timestamp;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export identifier types
pub use ids::{AgentId, AreaId};

// Re-export timestamp types
pub use timestamp::{
    ParseTimestampError, Timestamp, MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE,
};

// Re-export area types
pub use area::{Area, AreaFacility, AreaPosition, AreaType, DEFAULT_MAX_VISIBLE};

// Re-export record types
pub use interaction::{InteractionKind, InteractionRecord};
pub use occupant::{Occupant, VisibleEntry};

// Re-export snapshot types
pub use snapshot::{generate_snapshot_id, AreaSnapshot, PresenceSnapshot};
pub use tally::VisitTally;
