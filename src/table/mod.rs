//! Per-state, per-payload-type transition tables.
//!
//! A table maps payload values of one type to resolutions. It holds two
//! kinds of rules:
//! - **static rules**: exact value matches, at most one per value
//! - **dynamic resolvers**: functions consulted before the static rules,
//!   most recently registered first
//!
//! It also carries the payload-typed entry/exit/excite callbacks, which run
//! only for transitions triggered by a payload of this type.

mod error;

pub use error::TableError;

use crate::callbacks::{CallbackList, CallbackResult};
use crate::core::{Handle, Payload, Resolution, State, TriggerKind};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Function computing a resolution from a payload at resolution time.
pub type Resolver<S, A> = Arc<dyn Fn(&A) -> Resolution<S> + Send + Sync>;

struct StaticRule<S> {
    handle: Handle,
    resolution: Resolution<S>,
}

/// Transition rules and payload-typed callbacks for one `(state, payload type)` pair.
///
/// Obtained from `StateConfiguration::table_for::<A>()`; the same table is
/// returned on every call, so handles stay valid for the machine's lifetime.
///
/// # Example
///
/// ```rust
/// use statetree::core::{Resolution, TriggerKind};
/// use statetree::table::TransitionTable;
///
/// let table: TransitionTable<&str, &str> = TransitionTable::new();
/// table.register_static("W", "Jump", TriggerKind::Transition).unwrap();
/// table.register_dynamic(|key: &&str| {
///     if key.starts_with('S') {
///         Resolution::Transition("Crouch")
///     } else {
///         Resolution::Ignore
///     }
/// });
///
/// assert_eq!(table.resolve(&"W").unwrap(), Resolution::Transition("Jump"));
/// assert_eq!(table.resolve(&"Shift").unwrap(), Resolution::Transition("Crouch"));
/// assert_eq!(table.resolve(&"Q").unwrap(), Resolution::Ignore);
/// ```
pub struct TransitionTable<S: State, A: Payload> {
    static_rules: RwLock<HashMap<A, StaticRule<S>>>,
    dynamic_rules: RwLock<Vec<(Handle, Resolver<S, A>)>>,
    on_entry_from: CallbackList<A>,
    on_exit_from: CallbackList<A>,
    on_excite_from: CallbackList<A>,
}

impl<S: State, A: Payload> TransitionTable<S, A> {
    pub fn new() -> Self {
        Self {
            static_rules: RwLock::new(HashMap::new()),
            dynamic_rules: RwLock::new(Vec::new()),
            on_entry_from: CallbackList::new(),
            on_exit_from: CallbackList::new(),
            on_excite_from: CallbackList::new(),
        }
    }

    /// Map `value` to `(target, kind)`.
    ///
    /// Fails with [`TableError::DuplicateStaticRule`] and leaves the table
    /// unchanged if `value` already has a static rule.
    pub fn register_static(
        &self,
        value: A,
        target: S,
        kind: TriggerKind,
    ) -> Result<Handle, TableError> {
        let mut rules = self
            .static_rules
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if rules.contains_key(&value) {
            return Err(TableError::DuplicateStaticRule {
                value: format!("{value:?}"),
            });
        }
        let handle = Handle::new();
        rules.insert(
            value,
            StaticRule {
                handle,
                resolution: Resolution::from_parts(target, kind),
            },
        );
        Ok(handle)
    }

    /// Put `resolver` at the front of the dynamic chain.
    pub fn register_dynamic<F>(&self, resolver: F) -> Handle
    where
        F: Fn(&A) -> Resolution<S> + Send + Sync + 'static,
    {
        let handle = Handle::new();
        self.dynamic_rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(0, (handle, Arc::new(resolver)));
        handle
    }

    /// Remove the static rule or dynamic resolver registered under `handle`.
    ///
    /// Returns `false` if nothing matched; revoking twice is a no-op.
    pub fn revoke(&self, handle: Handle) -> bool {
        {
            let mut dynamic = self
                .dynamic_rules
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let before = dynamic.len();
            dynamic.retain(|(h, _)| *h != handle);
            if dynamic.len() != before {
                return true;
            }
        }

        let mut rules = self
            .static_rules
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = rules.len();
        rules.retain(|_, rule| rule.handle != handle);
        rules.len() != before
    }

    /// Resolve `value`, checking every dynamic resolver for conflicts.
    ///
    /// The most recently registered resolver returning something other than
    /// `Ignore` decides the outcome. If a different resolver claims the same
    /// value with a different outcome, resolution fails with
    /// [`TableError::AmbiguousDynamicResolution`]. Without a dynamic claim
    /// the static rules are matched exactly, and `Ignore` is returned when
    /// nothing matches.
    pub fn resolve(&self, value: &A) -> Result<Resolution<S>, TableError> {
        let mut claimed: Option<Resolution<S>> = None;
        for resolver in self.dynamic_snapshot() {
            let resolution = resolver(value);
            if resolution.is_ignore() {
                continue;
            }
            match &claimed {
                None => claimed = Some(resolution),
                Some(first) if *first != resolution => {
                    return Err(TableError::AmbiguousDynamicResolution {
                        value: format!("{value:?}"),
                        first: format!("{first:?}"),
                        second: format!("{resolution:?}"),
                    });
                }
                Some(_) => {}
            }
        }

        match claimed {
            Some(resolution) => Ok(resolution),
            None => Ok(self.resolve_static(value)),
        }
    }

    /// Resolve `value`, stopping at the first dynamic resolver that claims it.
    pub fn resolve_first(&self, value: &A) -> Resolution<S> {
        self.dynamic_snapshot()
            .into_iter()
            .map(|resolver| resolver(value))
            .find(|resolution| !resolution.is_ignore())
            .unwrap_or_else(|| self.resolve_static(value))
    }

    pub fn static_rule_count(&self) -> usize {
        self.static_rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn dynamic_rule_count(&self) -> usize {
        self.dynamic_rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Register a callback run when a transition triggered by this payload
    /// type enters the owning state.
    pub fn on_entry_from<F, Fut>(&self, callback: F) -> Handle
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.on_entry_from.register(callback)
    }

    /// Register a callback run when a transition triggered by this payload
    /// type leaves the owning state.
    pub fn on_exit_from<F, Fut>(&self, callback: F) -> Handle
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.on_exit_from.register(callback)
    }

    /// Register a callback run when a payload of this type excites the
    /// owning state.
    pub fn on_excite_from<F, Fut>(&self, callback: F) -> Handle
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.on_excite_from.register(callback)
    }

    /// Revoke a payload-typed callback from whichever list holds it.
    pub fn revoke_callback(&self, handle: Handle) -> bool {
        self.on_entry_from.revoke(handle)
            || self.on_exit_from.revoke(handle)
            || self.on_excite_from.revoke(handle)
    }

    pub(crate) async fn run_entry_from(&self, payload: A) -> CallbackResult {
        self.on_entry_from.run_all(payload).await
    }

    pub(crate) async fn run_exit_from(&self, payload: A) -> CallbackResult {
        self.on_exit_from.run_all(payload).await
    }

    pub(crate) async fn run_excite_from(&self, payload: A) -> CallbackResult {
        self.on_excite_from.run_all(payload).await
    }

    fn resolve_static(&self, value: &A) -> Resolution<S> {
        self.static_rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(value)
            .map(|rule| rule.resolution.clone())
            .unwrap_or_default()
    }

    // Resolvers run outside the lock so they may register rules themselves.
    fn dynamic_snapshot(&self) -> Vec<Resolver<S, A>> {
        self.dynamic_rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, resolver)| Arc::clone(resolver))
            .collect()
    }
}

impl<S: State, A: Payload> Default for TransitionTable<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, A: Payload> fmt::Debug for TransitionTable<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTable")
            .field("static_rules", &self.static_rule_count())
            .field("dynamic_rules", &self.dynamic_rule_count())
            .field("on_entry_from", &self.on_entry_from)
            .field("on_exit_from", &self.on_exit_from)
            .field("on_excite_from", &self.on_excite_from)
            .finish()
    }
}
