//! Agent existence checks.
//!
//! The service does not own agent records; it asks a directory supplied by
//! the host whether an id refers to a real agent.

use area_events::AgentId;
use std::collections::HashSet;

/// Answers "does this agent exist?" (to allow swapping in the host's registry).
pub trait AgentDirectory: Send + Sync {
    fn contains(&self, agent: &AgentId) -> bool;
}

/// Accepts every id.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenDirectory;

impl AgentDirectory for OpenDirectory {
    fn contains(&self, _agent: &AgentId) -> bool {
        true
    }
}

impl AgentDirectory for HashSet<AgentId> {
    fn contains(&self, agent: &AgentId) -> bool {
        HashSet::contains(self, agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_directory_accepts_anyone() {
        assert!(OpenDirectory.contains(&AgentId::from("anyone")));
    }

    #[test]
    fn test_set_directory() {
        let known: HashSet<AgentId> = ["a", "b"].into_iter().map(AgentId::from).collect();
        let directory: &dyn AgentDirectory = &known;
        assert!(directory.contains(&AgentId::from("a")));
        assert!(!directory.contains(&AgentId::from("z")));
    }
}
