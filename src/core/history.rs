//! Bounded history of completed transitions.
//!
//! `record` consumes a history and returns it with the transition appended,
//! discarding the oldest entries beyond the limit. Clone first to keep the
//! previous value.

use super::state::State;
use super::transition::Transition;
use std::collections::VecDeque;
use std::time::Duration;

/// Ordered, size-bounded log of recent transitions.
///
/// # Example
///
/// ```rust
/// use statetree::core::{StateHistory, Transition, TriggerKind};
///
/// let history = StateHistory::with_limit(2)
///     .record(Transition::bare("A", "B", TriggerKind::Transition))
///     .record(Transition::bare("B", "C", TriggerKind::Transition))
///     .record(Transition::bare("C", "D", TriggerKind::Transition));
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.get_path(), vec![&"B", &"C", &"D"]);
/// ```
#[derive(Clone, Debug)]
pub struct StateHistory<S: State> {
    transitions: VecDeque<Transition<S>>,
    limit: usize,
}

impl<S: State> StateHistory<S> {
    /// Create an empty history keeping at most `limit` transitions.
    ///
    /// A limit of zero keeps nothing.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: VecDeque::new(),
            limit,
        }
    }

    /// Record a transition, returning the updated history.
    pub fn record(mut self, transition: Transition<S>) -> Self {
        if self.limit > 0 {
            self.transitions.push_back(transition);
            while self.transitions.len() > self.limit {
                self.transitions.pop_front();
            }
        }
        self
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained transition, then
    /// the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Duration from the oldest to the newest retained transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Retained transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition<S>> {
        self.transitions.iter()
    }

    pub fn last(&self) -> Option<&Transition<S>> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
