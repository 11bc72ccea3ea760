//! Build errors for the state machine builder.

use crate::config::ConfigError;
use crate::hierarchy::HierarchyError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid state hierarchy: {0}")]
    Hierarchy(#[from] HierarchyError),
}
