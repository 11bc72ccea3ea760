//! Ordered, individually revocable async callback lists.
//!
//! Every entry/exit/excite hook in the engine lives in a [`CallbackList`].
//! Registration returns a [`Handle`]; revocation removes the entry with that
//! handle. Running a list fires every callback at once and waits for all of
//! them before reporting the first failure.

use crate::core::Handle;
use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Error raised by a user-supplied callback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result returned by every callback.
pub type CallbackResult = Result<(), CallbackError>;

type Callback<A> = Arc<dyn Fn(A) -> BoxFuture<'static, CallbackResult> + Send + Sync>;

/// Ordered list of `(handle, callback)` pairs taking an argument of type `A`.
///
/// Zero-argument hooks use `CallbackList<()>`.
///
/// # Example
///
/// ```rust
/// use statetree::callbacks::CallbackList;
///
/// # #[tokio::main]
/// # async fn main() {
/// let list: CallbackList<u32> = CallbackList::new();
/// let handle = list.register(|n| async move {
///     assert_eq!(n, 7);
///     Ok(())
/// });
///
/// list.run_all(7).await.unwrap();
/// assert!(list.revoke(handle));
/// assert!(!list.revoke(handle));
/// # }
/// ```
pub struct CallbackList<A> {
    entries: RwLock<Vec<(Handle, Callback<A>)>>,
}

impl<A: Clone + Send + 'static> CallbackList<A> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Append a callback and return its revocation handle.
    pub fn register<F, Fut>(&self, callback: F) -> Handle
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        let handle = Handle::new();
        let callback: Callback<A> = Arc::new(move |arg| callback(arg).boxed());
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((handle, callback));
        handle
    }

    /// Remove the callback registered under `handle`.
    ///
    /// Returns `false` if nothing was removed; revoking twice is a no-op.
    pub fn revoke(&self, handle: Handle) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(h, _)| *h != handle);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every registered callback concurrently with a clone of `arg`.
    ///
    /// All callbacks run to completion; the first error in registration
    /// order is returned. Callbacks registered or revoked while the list is
    /// running take effect on the next run.
    pub async fn run_all(&self, arg: A) -> CallbackResult {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return Ok(());
        }
        let results = join_all(snapshot.iter().map(|callback| callback(arg.clone()))).await;
        results.into_iter().collect()
    }

    fn snapshot(&self) -> Vec<Callback<A>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }
}

impl<A: Clone + Send + 'static> Default for CallbackList<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for CallbackList<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self
            .entries
            .read()
            .map(|entries| entries.len())
            .unwrap_or_default();
        f.debug_struct("CallbackList").field("len", &len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[tokio::test]
    async fn run_all_invokes_every_callback() {
        let list: CallbackList<()> = CallbackList::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            list.register(move |_| {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            });
        }

        list.run_all(()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn callbacks_run_concurrently() {
        let list: CallbackList<()> = CallbackList::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for (name, delay) in [("slow", 30u64), ("fast", 0u64)] {
            let log = Arc::clone(&log);
            list.register(move |_| {
                let log = Arc::clone(&log);
                async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    log.lock().unwrap().push(name);
                    Ok(())
                }
            });
        }

        list.run_all(()).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["fast", "slow"]);
    }

    #[tokio::test]
    async fn failure_is_reported_after_all_callbacks_finish() {
        let list: CallbackList<u8> = CallbackList::new();
        let finished = Arc::new(AtomicUsize::new(0));

        list.register(|_| async { Err(CallbackError::new("boom")) });
        let counter = Arc::clone(&finished);
        list.register(move |_| {
            let counter = Arc::clone(&counter);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let err = list.run_all(1).await.unwrap_err();
        assert_eq!(err.message(), "boom");
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn revoked_callback_is_not_invoked() {
        let list: CallbackList<()> = CallbackList::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let handle = list.register(move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        assert!(list.revoke(handle));
        assert!(!list.revoke(handle));
        assert!(list.is_empty());

        list.run_all(()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn argument_is_passed_to_each_callback() {
        let list: CallbackList<String> = CallbackList::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            list.register(move |value: String| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.lock().unwrap().push(value);
                    Ok(())
                }
            });
        }

        list.run_all("jump".to_string()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["jump", "jump"]);
    }
}
