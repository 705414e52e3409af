//! Configuration loading for the presence service.
//!
//! All tuning knobs are loaded from a TOML file; every field has a default so
//! a partial file (or none at all) is valid.

use area_events::{Area, DEFAULT_MAX_VISIBLE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::scoring::InteractionWeights;

/// Complete presence service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Visibility scoring and selection settings
    #[serde(default)]
    pub visibility: VisibilityConfig,
    /// Interaction history retention
    #[serde(default)]
    pub history: HistoryConfig,
    /// Areas to register at start; the default city is seeded when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub areas: Vec<Area>,
}

impl PresenceConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: PresenceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values that would make scoring meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.visibility;
        if v.recency_window_hours == 0 {
            return Err(ConfigError::Invalid(
                "visibility.recency_window_hours must be positive".to_string(),
            ));
        }
        if !(v.novelty_bonus >= 0.0) {
            return Err(ConfigError::Invalid(
                "visibility.novelty_bonus must be non-negative".to_string(),
            ));
        }
        if let Some((kind, weight)) = v.weights.entries().find(|(_, w)| !(*w >= 0.0)) {
            return Err(ConfigError::Invalid(format!(
                "visibility.weights.{} must be non-negative, got {}",
                kind, weight
            )));
        }
        if self.history.max_entries_per_agent == 0 {
            return Err(ConfigError::Invalid(
                "history.max_entries_per_agent must be positive".to_string(),
            ));
        }
        for area in &self.areas {
            if area.capacity == 0 {
                return Err(ConfigError::Invalid(format!(
                    "area `{}` must have a positive capacity",
                    area.id
                )));
            }
        }
        Ok(())
    }
}

/// Visibility scoring and selection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Visibility cap given to the seeded default areas
    pub default_max_visible: usize,
    /// Interactions older than this contribute nothing
    pub recency_window_hours: u64,
    /// How long a newcomer keeps a novelty bonus
    pub novelty_window_minutes: u64,
    /// Bonus for a candidate who entered just now
    pub novelty_bonus: f64,
    /// Weight per interaction kind
    pub weights: InteractionWeights,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            default_max_visible: DEFAULT_MAX_VISIBLE,
            recency_window_hours: 7 * 24,
            novelty_window_minutes: 60,
            novelty_bonus: 0.5,
            weights: InteractionWeights::default(),
        }
    }
}

/// Interaction history retention configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Most recent entries kept per agent
    pub max_entries_per_agent: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries_per_agent: 100,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Public Area Presence Configuration

[visibility]
default_max_visible = 20
recency_window_hours = 168
novelty_window_minutes = 60
novelty_bonus = 0.5

[visibility.weights]
chat = 1.0
trade = 2.0
gift = 3.0
event = 5.0
visit = 0.5
unknown = 1.0

[history]
max_entries_per_agent = 100

# Leave [[areas]] out to seed the default city.
# [[areas]]
# id = "kiosk"
# name = "Corner Kiosk"
# area_type = "shop"
# capacity = 4
# max_visible = 3
"#
    .to_string()
}
