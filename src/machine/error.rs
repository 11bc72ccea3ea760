//! State machine error types.

use crate::callbacks::CallbackError;
use crate::hierarchy::HierarchyError;
use crate::table::TableError;
use std::fmt;
use thiserror::Error;

/// Which callback sequence a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackPhase {
    Entry,
    Exit,
    Excite,
}

impl fmt::Display for CallbackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::Excite => "excite",
        })
    }
}

/// Errors surfaced by state machine operations
#[derive(Debug, Error)]
pub enum MachineError {
    /// The machine has been disposed
    #[error("State machine has been disposed")]
    AlreadyDisposed,

    /// Rule registration or resolution failed
    #[error(transparent)]
    Table(#[from] TableError),

    /// Re-parenting would create a cycle
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// An entry, exit or excite callback failed; earlier callbacks are not rolled back
    #[error("{phase} callback failed for state '{state}': {source}")]
    CallbackFailure {
        phase: CallbackPhase,
        state: String,
        #[source]
        source: CallbackError,
    },
}

impl MachineError {
    pub(crate) fn callback(
        phase: CallbackPhase,
        state: &impl fmt::Debug,
        source: CallbackError,
    ) -> Self {
        Self::CallbackFailure {
            phase,
            state: format!("{state:?}"),
            source,
        }
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::AlreadyDisposed)
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            Self::Table(TableError::AmbiguousDynamicResolution { .. })
        )
    }
}
