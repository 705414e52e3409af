//! Interaction scoring with configurable weights.
//!
//! A candidate's score for an observer is the decayed, weighted sum of the
//! interactions the two share, plus a novelty bonus while the candidate is
//! fresh in the area.

use area_events::{InteractionKind, InteractionRecord, Timestamp, MILLIS_PER_HOUR, MILLIS_PER_MINUTE};
use serde::{Deserialize, Serialize};

use crate::config::VisibilityConfig;

/// Weight per interaction kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionWeights {
    pub chat: f64,
    pub trade: f64,
    pub gift: f64,
    pub event: f64,
    pub visit: f64,
    /// Applied to labels outside the known set
    pub unknown: f64,
}

impl Default for InteractionWeights {
    fn default() -> Self {
        Self {
            chat: 1.0,
            trade: 2.0,
            gift: 3.0,
            event: 5.0,
            visit: 0.5,
            unknown: 1.0,
        }
    }
}

impl InteractionWeights {
    /// Gets the weight for an interaction kind.
    pub fn weight(&self, kind: &InteractionKind) -> f64 {
        match kind {
            InteractionKind::Chat => self.chat,
            InteractionKind::Trade => self.trade,
            InteractionKind::Gift => self.gift,
            InteractionKind::Event => self.event,
            InteractionKind::Visit => self.visit,
            InteractionKind::Unknown(_) => self.unknown,
        }
    }

    /// Defaults with the given kinds replaced.
    pub fn with_overrides(overrides: &WeightOverrides) -> Self {
        let defaults = Self::default();
        Self {
            chat: overrides.chat.unwrap_or(defaults.chat),
            trade: overrides.trade.unwrap_or(defaults.trade),
            gift: overrides.gift.unwrap_or(defaults.gift),
            event: overrides.event.unwrap_or(defaults.event),
            visit: overrides.visit.unwrap_or(defaults.visit),
            unknown: overrides.unknown.unwrap_or(defaults.unknown),
        }
    }

    /// `(label, weight)` pairs, for validation and reporting.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("chat", self.chat),
            ("trade", self.trade),
            ("gift", self.gift),
            ("event", self.event),
            ("visit", self.visit),
            ("unknown", self.unknown),
        ]
        .into_iter()
    }
}

/// Partial weight table; unset kinds fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightOverrides {
    pub chat: Option<f64>,
    pub trade: Option<f64>,
    pub gift: Option<f64>,
    pub event: Option<f64>,
    pub visit: Option<f64>,
    pub unknown: Option<f64>,
}

/// Turns interaction history and presence age into candidate scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreModel {
    weights: InteractionWeights,
    /// Linear decay horizon for interactions
    recency_window_ms: u64,
    /// How long a newcomer keeps a novelty bonus
    novelty_window_ms: u64,
    novelty_bonus: f64,
}

impl Default for ScoreModel {
    fn default() -> Self {
        Self::from_config(&VisibilityConfig::default())
    }
}

impl ScoreModel {
    pub fn from_config(config: &VisibilityConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            recency_window_ms: config.recency_window_hours.saturating_mul(MILLIS_PER_HOUR),
            novelty_window_ms: config.novelty_window_minutes.saturating_mul(MILLIS_PER_MINUTE),
            novelty_bonus: config.novelty_bonus,
        }
    }

    pub fn weights(&self) -> &InteractionWeights {
        &self.weights
    }

    pub fn set_weights(&mut self, weights: InteractionWeights) {
        self.weights = weights;
    }

    /// `max(0, 1 - age / window)`.
    pub fn decay(&self, age_ms: u64) -> f64 {
        if self.recency_window_ms == 0 {
            return 0.0;
        }
        (1.0 - age_ms as f64 / self.recency_window_ms as f64).max(0.0)
    }

    /// Decayed, weighted sum over the given interactions.
    pub fn interaction_score<'a>(
        &self,
        records: impl IntoIterator<Item = &'a InteractionRecord>,
        now: Timestamp,
    ) -> f64 {
        records
            .into_iter()
            .map(|r| self.weights.weight(&r.kind) * self.decay(now.millis_since(r.timestamp)))
            .sum()
    }

    /// Bonus for a candidate who entered the area at `entered_at`.
    ///
    /// Full bonus at entry, falling linearly to zero at the end of the
    /// novelty window. An entry stamped in the future counts as age zero.
    pub fn time_bonus(&self, entered_at: Timestamp, now: Timestamp) -> f64 {
        if self.novelty_window_ms == 0 {
            return 0.0;
        }
        let age = now.millis_since(entered_at);
        if age >= self.novelty_window_ms {
            return 0.0;
        }
        (1.0 - age as f64 / self.novelty_window_ms as f64) * self.novelty_bonus
    }
}
