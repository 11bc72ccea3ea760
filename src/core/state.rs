//! Marker traits for state identifiers and event payloads.
//!
//! The engine never constructs states or payloads; it only compares,
//! hashes and clones them. Both traits are blanket-implemented, so any
//! type with the required capabilities can be used directly.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state identifiers tracked by a state machine.
///
/// A state is an opaque, caller-owned value. The machine only needs to
/// compare and hash it (to key its configuration registry and hierarchy)
/// and clone it (to publish transition records).
///
/// # Example
///
/// ```rust
/// use statetree::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Stance {
///     Idle,
///     Walk,
/// }
///
/// fn assert_state<S: State>(_: &S) {}
/// assert_state(&Stance::Idle);
/// assert_state(&"any string works too");
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> State for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Trait for event payloads submitted to `StateMachine::dispatch`.
///
/// Each distinct payload type gets its own transition table per state.
/// Payload values are matched by equality against static rules, so the
/// same capabilities as [`State`] are required.
pub trait Payload: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
