//! Presence and visibility for public areas.
//!
//! Tracks which agents are in which shared area and decides, for every
//! occupant, the bounded set of co-occupants it may perceive. Visible-sets
//! are kept consistent with occupancy on every enter and leave, and ranked by
//! decayed interaction history when an area holds more agents than an
//! observer may see.
//!
//! # Architecture
//!
//! ```text
//! enter/leave ──▶ PresenceLedger ──▶ VisibilityEngine ──▶ Vec<VisibilityUpdate>
//!                  (per-area lock)     (ScoreModel +         (to broadcast /
//!                                       InteractionHistory)    persistence)
//! ```
//!
//! # Modules
//!
//! - [`ledger`]: Per-area rosters and the agent → area index
//! - [`history`]: Rolling per-agent interaction history
//! - [`scoring`]: Interaction weights, decay, and novelty bonus
//! - [`visibility`]: Candidate ranking and sticky visible-set maintenance
//! - [`service`]: The `PresenceService` facade used by collaborators
//! - [`config`]: TOML configuration
//! - [`stats`]: Per-area visit statistics
//! - [`setup`]: Default area seeding

pub mod config;
pub mod directory;
pub mod error;
pub mod history;
pub mod ledger;
pub mod scoring;
pub mod service;
pub mod setup;
pub mod stats;
pub mod visibility;

// Re-export error types
pub use error::{AreaError, SnapshotError};

// Re-export config types
pub use config::{default_config_toml, ConfigError, HistoryConfig, PresenceConfig, VisibilityConfig};

// Re-export presence types
pub use directory::{AgentDirectory, OpenDirectory};
pub use history::InteractionHistory;
pub use ledger::{AreaRoster, PresenceLedger};

// Re-export scoring and visibility types
pub use scoring::{InteractionWeights, ScoreModel, WeightOverrides};
pub use visibility::{ScoredCandidate, VisibilityEngine, VisibilityUpdate};

// Re-export service types
pub use service::{EnterOutcome, PresenceService, DEFAULT_NEARBY_RADIUS};
pub use setup::create_default_areas;
pub use stats::{AreaStats, PEAK_HOURS};
