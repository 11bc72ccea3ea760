//! Immutable records of completed transitions.

use super::state::State;
use super::trigger::TriggerKind;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased payload attached to a transition record.
pub type SharedPayload = Arc<dyn Any + Send + Sync>;

/// Record of a single completed transition.
///
/// Records are built once, after the transition has fully succeeded, and are
/// then published to every subscriber. They are never mutated.
///
/// # Example
///
/// ```rust
/// use statetree::core::{Transition, TriggerKind};
///
/// let record = Transition::new("Idle", "Jump", TriggerKind::Transition, Some("W"));
///
/// assert_eq!(record.from, "Idle");
/// assert_eq!(record.to, "Jump");
/// assert_eq!(record.payload_as::<&str>(), Some(&"W"));
/// assert_eq!(record.payload_as::<u32>(), None);
/// ```
#[derive(Clone)]
pub struct Transition<S: State> {
    /// The state the machine was in when the request was resolved
    pub from: S,
    /// The resolved target (equal to `from` for interceptions)
    pub to: S,
    /// What the resolution instructed the machine to do
    pub kind: TriggerKind,
    /// The dispatched payload, if the transition was payload-triggered
    pub payload: Option<SharedPayload>,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

impl<S: State> Transition<S> {
    /// Build a record, stamping it with the current time.
    pub fn new<P>(from: S, to: S, kind: TriggerKind, payload: Option<P>) -> Self
    where
        P: Any + Send + Sync,
    {
        Self {
            from,
            to,
            kind,
            payload: payload.map(|p| Arc::new(p) as SharedPayload),
            timestamp: Utc::now(),
        }
    }

    /// Build a record that carries no payload.
    pub fn bare(from: S, to: S, kind: TriggerKind) -> Self {
        Self::new::<()>(from, to, kind, None)
    }

    /// Borrow the payload as `T`, if present and of that type.
    pub fn payload_as<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref()?.downcast_ref::<T>()
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Whether the machine's current state changed as a result.
    pub fn changes_state(&self) -> bool {
        matches!(self.kind, TriggerKind::Transition | TriggerKind::NoProcess)
    }
}

impl<S: State> fmt::Debug for Transition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("kind", &self.kind)
            .field("has_payload", &self.payload.is_some())
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
