//! Transition table error types.

use thiserror::Error;

/// Errors that can occur when registering or resolving table rules
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    /// A static rule for this payload value already exists; the table is unchanged
    #[error("A static rule for payload {value} is already registered")]
    DuplicateStaticRule { value: String },

    /// Two dynamic resolvers claimed the same payload with different outcomes
    #[error("Dynamic resolvers disagree on payload {value}: {first} vs {second}")]
    AmbiguousDynamicResolution {
        value: String,
        first: String,
        second: String,
    },
}
