//! Configuration error types.

use thiserror::Error;

/// A single problem found while validating a configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigIssue {
    #[error("name must not be empty")]
    EmptyName,

    #[error("history_limit {found} exceeds the maximum of {max}")]
    HistoryTooLarge { found: usize, max: usize },
}

/// Errors that can occur when loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text could not be parsed
    #[error("Configuration parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// One or more fields are out of range
    #[error("Invalid configuration: {}", render(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn render(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
