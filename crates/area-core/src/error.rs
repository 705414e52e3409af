//! Error types surfaced to collaborators.

use area_events::{AgentId, AreaId};
use thiserror::Error;

/// Failures of presence operations.
///
/// None of these are retried internally; the caller decides whether to wait
/// for capacity or pick another area.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AreaError {
    #[error("area `{0}` not found")]
    AreaNotFound(AreaId),

    #[error("area `{0}` is currently closed")]
    AreaInactive(AreaId),

    #[error("area `{area}` is at full capacity ({capacity})")]
    CapacityExceeded { area: AreaId, capacity: usize },

    #[error("agent `{agent}` is already present in area `{area}`")]
    AlreadyPresent { agent: AgentId, area: AreaId },

    #[error("unknown agent `{0}`")]
    UnknownAgent(AgentId),
}

impl AreaError {
    /// Stable machine-readable code for the transport layer.
    pub fn reason_code(&self) -> &'static str {
        match self {
            AreaError::AreaNotFound(_) => "area_not_found",
            AreaError::AreaInactive(_) => "area_inactive",
            AreaError::CapacityExceeded { .. } => "capacity_exceeded",
            AreaError::AlreadyPresent { .. } => "already_present",
            AreaError::UnknownAgent(_) => "unknown_agent",
        }
    }
}

/// Failures when rebuilding a service from a persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("occupant of `{area}` references area `{found}`")]
    MismatchedArea { area: AreaId, found: AreaId },

    #[error("agent `{agent}` is open in both `{first}` and `{second}`")]
    DuplicatePresence {
        agent: AgentId,
        first: AreaId,
        second: AreaId,
    },

    #[error("area `{0}` appears twice in the snapshot")]
    DuplicateArea(AreaId),
}
