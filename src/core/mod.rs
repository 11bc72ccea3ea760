//! Core value types shared by every part of the engine.
//!
//! This module contains the plain data of the state machine:
//! - State and payload capabilities via the `State` and `Payload` traits
//! - Trigger kinds and resolution outcomes
//! - Immutable transition records and a bounded history of them
//! - Revocation handles
//!
//! Nothing in this module performs I/O or awaits.

mod handle;
mod history;
mod state;
mod transition;
mod trigger;

pub use handle::Handle;
pub use history::StateHistory;
pub use state::{Payload, State};
pub use transition::{SharedPayload, Transition};
pub use trigger::{Resolution, TriggerKind};
