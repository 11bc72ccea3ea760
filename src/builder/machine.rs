//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::config::MachineConfig;
use crate::core::State;
use crate::hierarchy::HierarchyIndex;
use crate::machine::StateMachine;

/// Builder for constructing state machines with a fluent API.
pub struct StateMachineBuilder<S: State> {
    initial: Option<S>,
    config: MachineConfig,
    substates: Vec<(S, S)>,
}

impl<S: State> StateMachineBuilder<S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            config: MachineConfig::default(),
            substates: Vec::new(),
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Replace the default configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for setting only the machine's log name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Declare `child` as a substate of `parent`.
    ///
    /// Declarations are applied in order, so a later one re-parents `child`.
    pub fn substate(mut self, child: S, parent: S) -> Self {
        self.substates.push((child, parent));
        self
    }

    /// Declare several substates of the same parent.
    pub fn substates(mut self, parent: S, children: impl IntoIterator<Item = S>) -> Self {
        self.substates
            .extend(children.into_iter().map(|child| (child, parent.clone())));
        self
    }

    /// Build the state machine.
    /// Returns an error if the initial state is missing, the configuration
    /// is invalid, or the declared hierarchy contains a cycle.
    pub fn build(self) -> Result<StateMachine<S>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let config = self.config.validated()?;

        let mut hierarchy = HierarchyIndex::new();
        for (child, parent) in self.substates {
            hierarchy.set_parent(child, Some(parent))?;
        }

        Ok(StateMachine::from_parts(initial, config, hierarchy))
    }
}

impl<S: State> Default for StateMachineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
