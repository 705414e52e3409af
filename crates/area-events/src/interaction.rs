//! Interaction Records
//!
//! One timestamped interaction between two agents, independent of area.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::ids::AgentId;
use crate::timestamp::Timestamp;

/// Kind of interaction between two agents.
///
/// Labels that arrive from the transport layer but match none of the known
/// kinds are kept verbatim as `Unknown` so that scoring can still weigh them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Casual contact (chatting)
    Chat,
    Trade,
    Gift,
    /// Attending the same social event
    Event,
    /// Simple co-presence
    Visit,
    Unknown(String),
}

impl InteractionKind {
    /// Parses a transport label. Never fails.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "chat" => InteractionKind::Chat,
            "trade" => InteractionKind::Trade,
            "gift" => InteractionKind::Gift,
            "event" => InteractionKind::Event,
            "visit" => InteractionKind::Visit,
            _ => InteractionKind::Unknown(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            InteractionKind::Chat => "chat",
            InteractionKind::Trade => "trade",
            InteractionKind::Gift => "gift",
            InteractionKind::Event => "event",
            InteractionKind::Visit => "visit",
            InteractionKind::Unknown(label) => label,
        }
    }

    /// Returns the known (closed-set) kinds.
    pub fn known() -> &'static [InteractionKind] {
        &[
            InteractionKind::Chat,
            InteractionKind::Trade,
            InteractionKind::Gift,
            InteractionKind::Event,
            InteractionKind::Visit,
        ]
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, InteractionKind::Unknown(_))
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for InteractionKind {
    fn from(label: &str) -> Self {
        InteractionKind::from_label(label)
    }
}

// Serialized as the bare label so unknown kinds survive a round trip
impl Serialize for InteractionKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for InteractionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(InteractionKind::from_label(&s))
    }
}

/// One entry in an agent's interaction history.
///
/// Stored once per participant: A's copy has `with = B`, B's copy has
/// `with = A`, both with the same kind and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub kind: InteractionKind,
    /// The other participant
    pub with: AgentId,
    pub timestamp: Timestamp,
}

impl InteractionRecord {
    pub fn new(kind: InteractionKind, with: impl Into<AgentId>, timestamp: Timestamp) -> Self {
        Self {
            kind,
            with: with.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels_parse() {
        assert_eq!(InteractionKind::from_label("chat"), InteractionKind::Chat);
        assert_eq!(InteractionKind::from_label("Trade"), InteractionKind::Trade);
        assert_eq!(InteractionKind::from_label(" gift "), InteractionKind::Gift);
        assert_eq!(InteractionKind::from_label("event"), InteractionKind::Event);
        assert_eq!(InteractionKind::from_label("visit"), InteractionKind::Visit);
    }

    #[test]
    fn test_unknown_label_is_kept() {
        let kind = InteractionKind::from_label("high_five");
        assert_eq!(kind, InteractionKind::Unknown("high_five".to_string()));
        assert!(!kind.is_known());
        assert_eq!(kind.label(), "high_five");
    }

    #[test]
    fn test_kind_serializes_as_label() {
        let record = InteractionRecord::new(
            InteractionKind::from_label("serenade"),
            "agent_b",
            Timestamp::from_millis(7),
        );
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"kind":"serenade","with":"agent_b","timestamp":7}"#);

        let parsed: InteractionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
