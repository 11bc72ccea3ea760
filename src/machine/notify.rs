//! Fan-out of completed transitions to live subscribers.
//!
//! The lock holder is the only writer. Each subscriber owns its own
//! unbounded queue, so a slow subscriber never blocks the writer or other
//! subscribers and never loses a record. Dropping the senders on disposal
//! ends every stream once it is drained.

use crate::core::{State, Transition};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;

type Subscribers<S> = Vec<mpsc::UnboundedSender<Transition<S>>>;

pub(crate) struct Notifier<S: State> {
    machine: String,
    subscribers: Mutex<Option<Subscribers<S>>>,
}

impl<S: State> Notifier<S> {
    pub(crate) fn new(machine: &str) -> Self {
        Self {
            machine: machine.to_string(),
            subscribers: Mutex::new(Some(Vec::new())),
        }
    }

    /// Deliver `transition` to every current subscriber.
    ///
    /// Subscribers whose stream was dropped are pruned.
    pub(crate) fn publish(&self, transition: Transition<S>) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(subscribers) = subscribers.as_mut() else {
            return;
        };

        let before = subscribers.len();
        subscribers.retain(|sender| sender.send(transition.clone()).is_ok());
        let dropped = before - subscribers.len();
        if dropped > 0 {
            tracing::debug!(
                machine = %self.machine,
                dropped,
                "pruned closed transition subscribers"
            );
        }
    }

    pub(crate) fn subscribe(&self) -> TransitionStream<S> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // After close the sender is dropped here and the stream is already finished.
        if let Some(subscribers) = subscribers.as_mut() {
            subscribers.push(sender);
        }
        TransitionStream { receiver }
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |subscribers| {
                subscribers.iter().filter(|s| !s.is_closed()).count()
            })
    }

    /// Drop every sender so each stream terminates once drained.
    pub(crate) fn close(&self) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// A subscription to a machine's completed transitions.
///
/// Yields every record published after the subscription was created, in
/// emission order, and ends when the machine is disposed.
pub struct TransitionStream<S: State> {
    receiver: mpsc::UnboundedReceiver<Transition<S>>,
}

impl<S: State> TransitionStream<S> {
    /// Wait for the next transition, or `None` once the machine is disposed
    /// and every buffered record has been taken.
    pub async fn next_transition(&mut self) -> Option<Transition<S>> {
        self.receiver.recv().await
    }

    /// Take the next transition if one is already buffered.
    pub fn try_next(&mut self) -> Option<Transition<S>> {
        self.receiver.try_recv().ok()
    }

    /// Number of records buffered and not yet taken.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    pub fn into_stream(self) -> impl Stream<Item = Transition<S>> {
        UnboundedReceiverStream::new(self.receiver)
    }
}
