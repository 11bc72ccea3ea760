//! The state machine and its per-state configuration.
//!
//! This module is the imperative shell of the engine:
//! - `StateConfiguration` holds callbacks and transition tables per state
//! - `StateMachine` serializes transitions and runs callback sequences
//! - `TransitionStream` delivers completed transitions to observers

mod configuration;
mod error;
mod notify;
mod state_machine;

pub use configuration::StateConfiguration;
pub use error::{CallbackPhase, MachineError};
pub use notify::TransitionStream;
pub use state_machine::{MachineStatus, StateMachine};
