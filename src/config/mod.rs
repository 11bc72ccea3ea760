//! Machine configuration.
//!
//! Validation uses Stillwater's `Validation` type so that every problem in
//! a configuration is reported at once instead of stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use statetree::config::MachineConfig;
//!
//! let config = MachineConfig::from_json_str(r#"{ "name": "player", "history_limit": 8 }"#)
//!     .unwrap();
//!
//! assert_eq!(config.name, "player");
//! assert_eq!(config.history_limit, 8);
//! assert!(config.detect_ambiguous_resolvers);
//! ```

mod error;

pub use error::{ConfigError, ConfigIssue};

use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Largest number of transitions kept in memory.
pub const MAX_HISTORY_LIMIT: usize = 10_000;

/// Tunables for a single state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Identifier attached to every log event
    pub name: String,

    /// Recent transitions kept for `StateMachine::history`; 0 disables it
    pub history_limit: usize,

    /// Consult every dynamic resolver and fail on conflicting claims
    pub detect_ambiguous_resolvers: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: "state-machine".to_string(),
            history_limit: 64,
            detect_ambiguous_resolvers: true,
        }
    }
}

impl MachineConfig {
    /// Parse a JSON document and validate it.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_ambiguity_detection(mut self, enabled: bool) -> Self {
        self.detect_ambiguous_resolvers = enabled;
        self
    }

    /// Check every field, accumulating ALL issues.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigIssue>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigIssue>>> = Vec::new();

        checks.push(if self.name.trim().is_empty() {
            Validation::fail(ConfigIssue::EmptyName)
        } else {
            Validation::success(())
        });

        checks.push(if self.history_limit > MAX_HISTORY_LIMIT {
            Validation::fail(ConfigIssue::HistoryTooLarge {
                found: self.history_limit,
                max: MAX_HISTORY_LIMIT,
            })
        } else {
            Validation::success(())
        });

        Validation::all_vec(checks).map(|_| ())
    }

    /// Return the configuration unchanged if it is valid.
    pub fn validated(self) -> Result<Self, ConfigError> {
        match self.validate() {
            Validation::Success(_) => Ok(self),
            Validation::Failure(issues) => {
                Err(ConfigError::Invalid(issues.iter().cloned().collect()))
            }
        }
    }
}
