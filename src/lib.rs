//! Statetree: a hierarchical, payload-typed async state machine
//!
//! A machine tracks one current state, resolves transitions from payloads
//! of any type, and runs entry/exit/excite callbacks along a state
//! hierarchy. Concurrent requests are serialized and every completed
//! transition is delivered to every subscriber.
//!
//! # Core Concepts
//!
//! - **State**: any `Clone + Eq + Hash + Debug` value; the machine never constructs one
//! - **Transition tables**: per state and payload type, static value rules plus dynamic resolvers
//! - **Trigger kinds**: `Transition`, `Excite`, `NoProcess`, `Intercept`, or `Ignore` to defer to the parent state
//! - **Hierarchy**: entering or leaving a substate involves its ancestors up to the nearest common one
//!
//! # Example
//!
//! ```rust
//! use statetree::core::TriggerKind;
//! use statetree::{state_enum, StateMachineBuilder};
//!
//! state_enum! {
//!     enum Stance {
//!         Move,
//!         Walk,
//!         Run,
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let machine = StateMachineBuilder::new()
//!     .initial(Stance::Walk)
//!     .substates(Stance::Move, [Stance::Walk, Stance::Run])
//!     .build()?;
//!
//! // Walk has no rule for "shift", so its parent Move resolves it.
//! machine
//!     .table_for::<&str>(Stance::Move)?
//!     .register_static("shift", Stance::Run, TriggerKind::Transition)?;
//!
//! machine.dispatch("shift").await?;
//! assert_eq!(machine.current_state(), Stance::Run);
//! assert!(machine.is_in(&Stance::Move));
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod callbacks;
pub mod config;
pub mod core;
pub mod hierarchy;
pub mod machine;
pub mod table;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use callbacks::{CallbackError, CallbackResult};
pub use config::MachineConfig;
pub use core::{Handle, Resolution, State, Transition, TriggerKind};
pub use machine::{MachineError, MachineStatus, StateConfiguration, StateMachine, TransitionStream};
pub use table::TransitionTable;
