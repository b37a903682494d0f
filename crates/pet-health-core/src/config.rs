//! Runtime configuration.
//!
//! Every field has a default, so hosts only need to send the values they
//! want to change:
//!
//! ```json
//! { "lookahead_days": 14 }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for the derived views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    /// How many days ahead an event still produces a reminder
    pub lookahead_days: u32,
    /// Maximum number of reminders kept after sorting
    pub max_notifications: usize,
    /// Reminders within this many days are warnings
    pub warning_days: u32,
    /// Name used in reminder text when the event has no pet name
    pub fallback_pet_name: String,
    /// Inline message shown when reminders could not be loaded
    pub load_error_message: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            lookahead_days: 30,
            max_notifications: 10,
            warning_days: 1,
            fallback_pet_name: "your pet".to_string(),
            load_error_message: "Could not load notifications.".to_string(),
        }
    }
}

impl CoreConfig {
    /// Parse and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values make sense together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_notifications == 0 {
            return Err(ConfigError::Invalid(
                "max_notifications must be at least 1".into(),
            ));
        }
        if self.warning_days > self.lookahead_days {
            return Err(ConfigError::Invalid(format!(
                "warning_days ({}) exceeds lookahead_days ({})",
                self.warning_days, self.lookahead_days
            )));
        }
        Ok(())
    }
}
