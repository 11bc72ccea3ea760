//! Revocation handles for registered rules and callbacks.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque token returned when a rule or callback is registered.
///
/// Revocation removes the entry whose handle compares equal; the callback
/// itself is never inspected. Handles are globally unique, so revoking a
/// handle against the wrong collection is a harmless no-op.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Handle(Uuid);

impl Handle {
    /// Create a fresh, unique handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying identifier.
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
