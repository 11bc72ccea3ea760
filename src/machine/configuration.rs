//! Per-state callbacks and transition tables.

use crate::callbacks::{CallbackList, CallbackResult};
use crate::core::{Handle, Payload, State};
use crate::table::TransitionTable;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

type ErasedTable = Arc<dyn Any + Send + Sync>;

/// Everything registered against a single state.
///
/// Holds the zero-argument entry, exit and excite callbacks plus one
/// [`TransitionTable`] per payload type ever queried for this state.
/// Configurations are created by the machine on first reference and live
/// as long as the machine.
pub struct StateConfiguration<S: State> {
    state: S,
    entry: CallbackList<()>,
    exit: CallbackList<()>,
    excite: CallbackList<()>,
    tables: RwLock<HashMap<TypeId, ErasedTable>>,
}

impl<S: State> StateConfiguration<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            entry: CallbackList::new(),
            exit: CallbackList::new(),
            excite: CallbackList::new(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// The state this configuration belongs to.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// The transition table for payloads of type `A`.
    ///
    /// Created on first call; every later call returns the same table.
    pub fn table_for<A: Payload>(&self) -> Arc<TransitionTable<S, A>> {
        let key = TypeId::of::<TransitionTable<S, A>>();

        let existing = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        let erased = match existing {
            Some(table) => table,
            None => {
                let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
                Arc::clone(tables.entry(key).or_insert_with(|| {
                    Arc::new(TransitionTable::<S, A>::new()) as ErasedTable
                }))
            }
        };

        erased
            .downcast::<TransitionTable<S, A>>()
            .unwrap_or_else(|_| unreachable!("tables are keyed by their own TypeId"))
    }

    /// Number of payload types with a table on this state.
    pub fn table_count(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn on_entry<F, Fut>(&self, callback: F) -> Handle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.entry.register(move |()| callback())
    }

    pub fn on_exit<F, Fut>(&self, callback: F) -> Handle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.exit.register(move |()| callback())
    }

    pub fn on_excite<F, Fut>(&self, callback: F) -> Handle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.excite.register(move |()| callback())
    }

    /// Revoke a zero-argument callback from whichever list holds it.
    pub fn revoke(&self, handle: Handle) -> bool {
        self.entry.revoke(handle) || self.exit.revoke(handle) || self.excite.revoke(handle)
    }

    pub async fn run_entry(&self) -> CallbackResult {
        self.entry.run_all(()).await
    }

    pub async fn run_exit(&self) -> CallbackResult {
        self.exit.run_all(()).await
    }

    pub async fn run_excite(&self) -> CallbackResult {
        self.excite.run_all(()).await
    }

    /// Payload-typed entry callbacks first, then the zero-argument ones.
    pub async fn run_entry_with<A: Payload>(&self, payload: A) -> CallbackResult {
        self.table_for::<A>().run_entry_from(payload).await?;
        self.run_entry().await
    }

    /// Payload-typed exit callbacks first, then the zero-argument ones.
    pub async fn run_exit_with<A: Payload>(&self, payload: A) -> CallbackResult {
        self.table_for::<A>().run_exit_from(payload).await?;
        self.run_exit().await
    }

    /// Payload-typed excite callbacks first, then the zero-argument ones.
    pub async fn run_excite_with<A: Payload>(&self, payload: A) -> CallbackResult {
        self.table_for::<A>().run_excite_from(payload).await?;
        self.run_excite().await
    }
}

impl<S: State> fmt::Debug for StateConfiguration<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateConfiguration")
            .field("state", &self.state)
            .field("entry", &self.entry)
            .field("exit", &self.exit)
            .field("excite", &self.excite)
            .field("tables", &self.table_count())
            .finish()
    }
}
