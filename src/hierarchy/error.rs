//! Hierarchy error types.

use thiserror::Error;

/// Errors that can occur when editing a state hierarchy
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HierarchyError {
    /// The new parent is the child itself or one of its descendants
    #[error("Setting parent of '{child}' to '{parent}' would create a cycle")]
    Cycle { child: String, parent: String },
}
