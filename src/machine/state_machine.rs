//! The hierarchical state machine orchestrator.

use crate::callbacks::CallbackError;
use crate::config::{ConfigError, MachineConfig};
use crate::core::{Payload, Resolution, State, StateHistory, Transition, TriggerKind};
use crate::hierarchy::HierarchyIndex;
use crate::machine::configuration::StateConfiguration;
use crate::machine::error::{CallbackPhase, MachineError};
use crate::machine::notify::{Notifier, TransitionStream};
use crate::table::TransitionTable;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{watch, Mutex, MutexGuard};

/// What the orchestrator itself is doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineStatus {
    /// No transition holds the lock
    Idle,

    /// A transition holds the lock and is running callbacks
    TransitionInFlight,

    /// Terminal; every mutating call fails with `AlreadyDisposed`
    Disposed,
}

/// Hierarchical state machine driven by typed payloads.
///
/// Mutating operations (`dispatch`, `transition_to`, `excite`, `dispose`)
/// are serialized by a single async lock, in the order they acquire it.
/// `current_state` and `is_in` never wait on that lock and may observe a
/// state that an in-flight transition is about to replace.
///
/// # Example
///
/// ```rust
/// use statetree::core::TriggerKind;
/// use statetree::StateMachine;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), statetree::MachineError> {
/// let machine = StateMachine::new("Idle");
/// machine
///     .table_for::<&str>("Idle")?
///     .register_static("W", "Jump", TriggerKind::Transition)?;
///
/// let mut transitions = machine.subscribe();
/// machine.dispatch("W").await?;
///
/// assert_eq!(machine.current_state(), "Jump");
/// let record = transitions.next_transition().await.unwrap();
/// assert_eq!((record.from, record.to), ("Idle", "Jump"));
/// # Ok(())
/// # }
/// ```
pub struct StateMachine<S: State> {
    config: MachineConfig,
    current: watch::Sender<S>,
    registry: RwLock<HashMap<S, Arc<StateConfiguration<S>>>>,
    hierarchy: RwLock<HierarchyIndex<S>>,
    gate: Mutex<()>,
    notifier: Notifier<S>,
    history: RwLock<StateHistory<S>>,
    disposed: AtomicBool,
}

impl<S: State> StateMachine<S> {
    /// Create a machine in `initial` with the default configuration.
    pub fn new(initial: S) -> Self {
        Self::from_parts(initial, MachineConfig::default(), HierarchyIndex::new())
    }

    /// Create a machine in `initial` after validating `config`.
    pub fn with_config(initial: S, config: MachineConfig) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        Ok(Self::from_parts(initial, config, HierarchyIndex::new()))
    }

    pub(crate) fn from_parts(
        initial: S,
        config: MachineConfig,
        hierarchy: HierarchyIndex<S>,
    ) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            notifier: Notifier::new(&config.name),
            history: RwLock::new(StateHistory::with_limit(config.history_limit)),
            config,
            current,
            registry: RwLock::new(HashMap::new()),
            hierarchy: RwLock::new(hierarchy),
            gate: Mutex::new(()),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// The current state. Never waits on the transition lock.
    pub fn current_state(&self) -> S {
        self.current.borrow().clone()
    }

    /// Receiver that observes every change of the current state.
    pub fn watch_state(&self) -> watch::Receiver<S> {
        self.current.subscribe()
    }

    /// True if `state` is the current state or one of its ancestors.
    pub fn is_in(&self, state: &S) -> bool {
        let current = self.current_state();
        current == *state || self.read_hierarchy().is_ancestor_or_self(state, &current)
    }

    pub fn status(&self) -> MachineStatus {
        if self.is_disposed() {
            MachineStatus::Disposed
        } else if self.gate.try_lock().is_err() {
            MachineStatus::TransitionInFlight
        } else {
            MachineStatus::Idle
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Subscribe to completed transitions.
    ///
    /// After disposal the returned stream is already finished.
    pub fn subscribe(&self) -> TransitionStream<S> {
        self.notifier.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    /// Snapshot of the most recent transitions.
    pub fn history(&self) -> StateHistory<S> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The configuration for `state`, created on first reference.
    ///
    /// Fails with `AlreadyDisposed` once `dispose` has started.
    pub fn configure(&self, state: S) -> Result<Arc<StateConfiguration<S>>, MachineError> {
        self.ensure_live()?;
        if let Some(config) = self.lookup(&state) {
            return Ok(config);
        }

        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        // dispose raises the flag before it clears the registry under this lock.
        self.ensure_live()?;
        Ok(Arc::clone(
            registry
                .entry(state.clone())
                .or_insert_with(|| Arc::new(StateConfiguration::new(state))),
        ))
    }

    /// Shorthand for `configure(state)?.table_for::<A>()`.
    pub fn table_for<A: Payload>(
        &self,
        state: S,
    ) -> Result<Arc<TransitionTable<S, A>>, MachineError> {
        Ok(self.configure(state)?.table_for::<A>())
    }

    /// Place `child` under `parent`, or detach it with `None`.
    pub fn set_parent(&self, child: S, parent: Option<S>) -> Result<(), MachineError> {
        self.ensure_live()?;
        tracing::debug!(
            machine = %self.config.name,
            child = ?child,
            parent = ?parent,
            "setting state parent"
        );
        self.hierarchy
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_parent(child, parent)?;
        Ok(())
    }

    pub fn parent_of(&self, state: &S) -> Option<S> {
        self.read_hierarchy().parent_of(state)
    }

    /// Run `state`'s excite callbacks without changing the current state.
    pub async fn excite(&self, state: S) -> Result<Transition<S>, MachineError> {
        let _guard = self.enter().await?;
        let from = self.current_state();

        if let Some(config) = self.lookup(&state) {
            config
                .run_excite()
                .await
                .map_err(|source| self.callback_failed(CallbackPhase::Excite, &state, source))?;
        }

        Ok(self.complete(Transition::bare(from, state, TriggerKind::Excite)))
    }

    /// Move to `state` unconditionally, bypassing every transition table.
    ///
    /// Exit callbacks run from the current state up to the common ancestor
    /// (exclusive), then entry callbacks from the ancestor down to `state`.
    pub async fn transition_to(&self, state: S) -> Result<Transition<S>, MachineError> {
        let _guard = self.enter().await?;
        let from = self.current_state();

        self.run_sequence::<()>(&from, &state, None).await?;
        self.current.send_replace(state.clone());

        Ok(self.complete(Transition::bare(from, state, TriggerKind::Transition)))
    }

    /// Resolve `payload` against the current state and act on the outcome.
    ///
    /// States whose table ignores the payload defer to their parent, up to
    /// the root. Returns `Ok(None)` when every state ignored it.
    pub async fn dispatch<A: Payload>(
        &self,
        payload: A,
    ) -> Result<Option<Transition<S>>, MachineError> {
        let _guard = self.enter().await?;
        let from = self.current_state();

        let Some((resolved_by, resolution)) = self.resolve(&from, &payload)? else {
            tracing::debug!(
                machine = %self.config.name,
                state = ?from,
                payload = ?payload,
                "payload ignored by every state in the hierarchy"
            );
            return Ok(None);
        };

        tracing::debug!(
            machine = %self.config.name,
            state = ?from,
            resolved_by = ?resolved_by,
            payload = ?payload,
            kind = %resolution.kind(),
            target = ?resolution.target(),
            "payload resolved"
        );

        let record = match resolution {
            Resolution::Ignore => return Ok(None),
            Resolution::Intercept => {
                Transition::new(from.clone(), from, TriggerKind::Intercept, Some(payload))
            }
            Resolution::Transition(target) => {
                self.run_sequence(&from, &target, Some(&payload)).await?;
                self.current.send_replace(target.clone());
                Transition::new(from, target, TriggerKind::Transition, Some(payload))
            }
            Resolution::Excite(target) => {
                if let Some(config) = self.lookup(&target) {
                    config
                        .run_excite_with(payload.clone())
                        .await
                        .map_err(|source| {
                            self.callback_failed(CallbackPhase::Excite, &target, source)
                        })?;
                }
                Transition::new(from, target, TriggerKind::Excite, Some(payload))
            }
            Resolution::NoProcess(target) => {
                self.current.send_replace(target.clone());
                Transition::new(from, target, TriggerKind::NoProcess, Some(payload))
            }
        };

        Ok(Some(self.complete(record)))
    }

    /// Stop accepting transitions and end every notification stream.
    ///
    /// Waits for the transition holding the lock to finish. Requests still
    /// queued on the lock fail with `AlreadyDisposed`.
    pub async fn dispose(&self) -> Result<(), MachineError> {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return Err(MachineError::AlreadyDisposed);
        }

        let _guard = self.gate.lock().await;
        self.notifier.close();
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        tracing::info!(
            machine = %self.config.name,
            state = ?self.current_state(),
            "state machine disposed"
        );
        Ok(())
    }

    // Transitions only read the registry: a state nobody configured has no
    // callbacks or rules, and an admitted transition keeps working while
    // dispose waits for it.
    fn lookup(&self, state: &S) -> Option<Arc<StateConfiguration<S>>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(state)
            .cloned()
    }

    fn ensure_live(&self) -> Result<(), MachineError> {
        if self.is_disposed() {
            Err(MachineError::AlreadyDisposed)
        } else {
            Ok(())
        }
    }

    // Checked again after acquiring: dispose may have started while we waited.
    async fn enter(&self) -> Result<MutexGuard<'_, ()>, MachineError> {
        self.ensure_live()?;
        let guard = self.gate.lock().await;
        self.ensure_live()?;
        Ok(guard)
    }

    fn read_hierarchy(&self) -> std::sync::RwLockReadGuard<'_, HierarchyIndex<S>> {
        self.hierarchy.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Walk from `from` towards the root until a table claims `payload`.
    fn resolve<A: Payload>(
        &self,
        from: &S,
        payload: &A,
    ) -> Result<Option<(S, Resolution<S>)>, MachineError> {
        let mut cursor = Some(from.clone());
        while let Some(state) = cursor {
            let Some(config) = self.lookup(&state) else {
                cursor = self.parent_of(&state);
                continue;
            };
            let table = config.table_for::<A>();
            let resolution = if self.config.detect_ambiguous_resolvers {
                match table.resolve(payload) {
                    Ok(resolution) => resolution,
                    Err(err) => {
                        tracing::warn!(
                            machine = %self.config.name,
                            state = ?state,
                            error = %err,
                            "ambiguous dynamic resolution"
                        );
                        return Err(err.into());
                    }
                }
            } else {
                table.resolve_first(payload)
            };

            if !resolution.is_ignore() {
                return Ok(Some((state, resolution)));
            }
            cursor = self.parent_of(&state);
        }
        Ok(None)
    }

    /// Exit up to the common ancestor of `from` and `to`, then enter down to `to`.
    async fn run_sequence<A: Payload>(
        &self,
        from: &S,
        to: &S,
        payload: Option<&A>,
    ) -> Result<(), MachineError> {
        let (exits, entries) = {
            let hierarchy = self.read_hierarchy();
            let ancestor = hierarchy.common_ancestor(from, to);
            (
                hierarchy.path_up(from, ancestor.as_ref()),
                hierarchy.path_down(ancestor.as_ref(), to),
            )
        };

        for state in &exits {
            let Some(config) = self.lookup(state) else {
                continue;
            };
            let result = match payload {
                Some(payload) => config.run_exit_with(payload.clone()).await,
                None => config.run_exit().await,
            };
            result.map_err(|source| self.callback_failed(CallbackPhase::Exit, state, source))?;
        }

        for state in &entries {
            let Some(config) = self.lookup(state) else {
                continue;
            };
            let result = match payload {
                Some(payload) => config.run_entry_with(payload.clone()).await,
                None => config.run_entry().await,
            };
            result.map_err(|source| self.callback_failed(CallbackPhase::Entry, state, source))?;
        }

        Ok(())
    }

    fn callback_failed(
        &self,
        phase: CallbackPhase,
        state: &S,
        source: CallbackError,
    ) -> MachineError {
        tracing::warn!(
            machine = %self.config.name,
            phase = %phase,
            state = ?state,
            error = %source,
            "callback failed, transition aborted"
        );
        MachineError::callback(phase, state, source)
    }

    /// Record and publish a finished transition.
    fn complete(&self, record: Transition<S>) -> Transition<S> {
        tracing::debug!(
            machine = %self.config.name,
            from = ?record.from,
            to = ?record.to,
            kind = %record.kind,
            "transition completed"
        );

        {
            let mut history = self.history.write().unwrap_or_else(PoisonError::into_inner);
            let current = std::mem::replace(&mut *history, StateHistory::with_limit(0));
            *history = current.record(record.clone());
        }
        self.notifier.publish(record.clone());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum Stance {
        Idle,
        Move,
        Walk,
        Run,
        Jump,
        Air,
    }

    type Log = Arc<StdMutex<Vec<String>>>;

    fn track(machine: &StateMachine<Stance>, state: Stance, log: &Log) {
        let config = machine.configure(state).unwrap();
        for (phase, list) in [("enter", 0), ("exit", 1), ("excite", 2)] {
            let log = Arc::clone(log);
            let callback = move || {
                log.lock().unwrap().push(format!("{phase}:{state:?}"));
                std::future::ready(Ok(()))
            };
            match list {
                0 => config.on_entry(callback),
                1 => config.on_exit(callback),
                _ => config.on_excite(callback),
            };
        }
    }

    fn hierarchy_machine(log: &Log) -> StateMachine<Stance> {
        let machine = StateMachine::new(Stance::Walk);
        machine.set_parent(Stance::Walk, Some(Stance::Move)).unwrap();
        machine.set_parent(Stance::Run, Some(Stance::Move)).unwrap();
        machine.set_parent(Stance::Jump, Some(Stance::Air)).unwrap();
        for state in [
            Stance::Idle,
            Stance::Move,
            Stance::Walk,
            Stance::Run,
            Stance::Jump,
            Stance::Air,
        ] {
            track(&machine, state, log);
        }
        machine
    }

    #[tokio::test]
    async fn transition_to_runs_exit_then_entry_along_the_hierarchy() {
        let log = Log::default();
        let machine = hierarchy_machine(&log);

        machine.transition_to(Stance::Jump).await.unwrap();

        assert_eq!(machine.current_state(), Stance::Jump);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["exit:Walk", "exit:Move", "enter:Air", "enter:Jump"]
        );
    }

    #[tokio::test]
    async fn sibling_transition_stops_at_common_ancestor() {
        let log = Log::default();
        let machine = hierarchy_machine(&log);

        machine.transition_to(Stance::Run).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["exit:Walk", "enter:Run"]);
        assert!(machine.is_in(&Stance::Move));
    }

    #[tokio::test]
    async fn self_transition_runs_no_callbacks() {
        let log = Log::default();
        let machine = hierarchy_machine(&log);

        let record = machine.transition_to(Stance::Walk).await.unwrap();

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(record.from, Stance::Walk);
        assert_eq!(record.to, Stance::Walk);
    }

    #[tokio::test]
    async fn excite_keeps_state_and_runs_excite_callbacks() {
        let log = Log::default();
        let machine = hierarchy_machine(&log);
        let mut stream = machine.subscribe();

        machine.excite(Stance::Move).await.unwrap();

        assert_eq!(machine.current_state(), Stance::Walk);
        assert_eq!(*log.lock().unwrap(), vec!["excite:Move"]);

        let record = stream.next_transition().await.unwrap();
        assert_eq!(record.from, Stance::Walk);
        assert_eq!(record.to, Stance::Move);
        assert_eq!(record.kind, TriggerKind::Excite);
        assert!(!record.has_payload());
    }

    #[tokio::test]
    async fn dispatch_falls_back_to_ancestor_tables() {
        let log = Log::default();
        let machine = hierarchy_machine(&log);
        machine
            .table_for::<char>(Stance::Move)
            .unwrap()
            .register_static(' ', Stance::Jump, TriggerKind::Transition)
            .unwrap();

        let record = machine.dispatch(' ').await.unwrap().unwrap();

        assert_eq!(record.to, Stance::Jump);
        assert_eq!(record.payload_as::<char>(), Some(&' '));
        assert_eq!(machine.current_state(), Stance::Jump);
    }

    #[tokio::test]
    async fn intercept_stops_the_walk_without_changing_state() {
        let log = Log::default();
        let machine = hierarchy_machine(&log);
        machine
            .table_for::<char>(Stance::Walk)
            .unwrap()
            .register_dynamic(|_| Resolution::Intercept);
        machine
            .table_for::<char>(Stance::Move)
            .unwrap()
            .register_static(' ', Stance::Jump, TriggerKind::Transition)
            .unwrap();

        let record = machine.dispatch(' ').await.unwrap().unwrap();

        assert_eq!(record.kind, TriggerKind::Intercept);
        assert_eq!(record.to, Stance::Walk);
        assert_eq!(machine.current_state(), Stance::Walk);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_process_changes_state_silently() {
        let log = Log::default();
        let machine = hierarchy_machine(&log);
        machine
            .table_for::<u8>(Stance::Walk)
            .unwrap()
            .register_static(0, Stance::Idle, TriggerKind::NoProcess)
            .unwrap();

        let record = machine.dispatch(0u8).await.unwrap().unwrap();

        assert_eq!(record.kind, TriggerKind::NoProcess);
        assert_eq!(machine.current_state(), Stance::Idle);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dispatched_excite_runs_typed_then_plain_callbacks() {
        let log = Log::default();
        let machine = hierarchy_machine(&log);
        let table = machine.table_for::<u8>(Stance::Walk).unwrap();
        table
            .register_static(9, Stance::Walk, TriggerKind::Excite)
            .unwrap();
        let typed = Arc::clone(&log);
        table.on_excite_from(move |n| {
            typed.lock().unwrap().push(format!("typed:{n}"));
            std::future::ready(Ok(()))
        });

        machine.dispatch(9u8).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["typed:9", "excite:Walk"]);
        assert_eq!(machine.current_state(), Stance::Walk);
    }

    #[tokio::test]
    async fn unclaimed_payload_is_a_no_op() {
        let log = Log::default();
        let machine = hierarchy_machine(&log);
        let mut stream = machine.subscribe();

        assert!(machine.dispatch("nothing").await.unwrap().is_none());
        assert_eq!(machine.current_state(), Stance::Walk);
        assert!(stream.try_next().is_none());
        assert!(machine.history().is_empty());
    }

    #[tokio::test]
    async fn failing_entry_callback_keeps_previous_state() {
        let machine = StateMachine::new(Stance::Idle);
        machine
            .configure(Stance::Run)
            .unwrap()
            .on_entry(|| std::future::ready(Err(CallbackError::new("no stamina"))));
        let mut stream = machine.subscribe();

        let err = machine.transition_to(Stance::Run).await.unwrap_err();

        assert!(matches!(
            err,
            MachineError::CallbackFailure {
                phase: CallbackPhase::Entry,
                ..
            }
        ));
        assert_eq!(machine.current_state(), Stance::Idle);
        assert!(stream.try_next().is_none());
        assert_eq!(machine.status(), MachineStatus::Idle);
        machine.transition_to(Stance::Walk).await.unwrap();
    }

    #[tokio::test]
    async fn ambiguity_detection_can_be_disabled() {
        let config = MachineConfig::default().with_ambiguity_detection(false);
        let machine = StateMachine::with_config(Stance::Idle, config).unwrap();
        let table = machine.table_for::<u8>(Stance::Idle).unwrap();
        table.register_dynamic(|_| Resolution::Transition(Stance::Walk));
        table.register_dynamic(|_| Resolution::Transition(Stance::Run));

        machine.dispatch(1u8).await.unwrap();
        assert_eq!(machine.current_state(), Stance::Run);
    }

    #[tokio::test]
    async fn ambiguous_resolution_fails_the_dispatch() {
        let machine = StateMachine::new(Stance::Idle);
        let table = machine.table_for::<u8>(Stance::Idle).unwrap();
        table.register_dynamic(|_| Resolution::Transition(Stance::Walk));
        table.register_dynamic(|_| Resolution::Transition(Stance::Run));

        let err = machine.dispatch(1u8).await.unwrap_err();
        assert!(err.is_ambiguous());
        assert_eq!(machine.current_state(), Stance::Idle);
    }

    #[tokio::test]
    async fn history_and_watch_track_transitions() {
        let machine = StateMachine::new(Stance::Idle);
        let mut watcher = machine.watch_state();

        machine.transition_to(Stance::Walk).await.unwrap();
        machine.transition_to(Stance::Run).await.unwrap();

        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), Stance::Run);
        assert_eq!(
            machine.history().get_path(),
            vec![&Stance::Idle, &Stance::Walk, &Stance::Run]
        );
    }

    #[tokio::test]
    async fn failing_excite_callback_emits_nothing_and_releases_the_lock() {
        let machine = StateMachine::new(Stance::Walk);
        let failing = machine
            .configure(Stance::Move)
            .unwrap()
            .on_excite(|| std::future::ready(Err(CallbackError::new("no footing"))));
        let mut stream = machine.subscribe();

        let err = machine.excite(Stance::Move).await.unwrap_err();

        assert!(matches!(
            err,
            MachineError::CallbackFailure {
                phase: CallbackPhase::Excite,
                ..
            }
        ));
        assert!(err.to_string().contains("no footing"));
        assert!(stream.try_next().is_none());
        assert!(machine.history().is_empty());
        assert_eq!(machine.status(), MachineStatus::Idle);

        assert!(machine.configure(Stance::Move).unwrap().revoke(failing));
        machine.excite(Stance::Move).await.unwrap();
        assert_eq!(stream.try_next().map(|t| t.kind), Some(TriggerKind::Excite));
    }

    #[tokio::test]
    async fn failing_dispatched_excite_propagates() {
        let machine = StateMachine::new(Stance::Walk);
        let table = machine.table_for::<u8>(Stance::Walk).unwrap();
        table
            .register_static(3, Stance::Move, TriggerKind::Excite)
            .unwrap();
        table
            .register_static(4, Stance::Run, TriggerKind::Transition)
            .unwrap();
        machine
            .table_for::<u8>(Stance::Move)
            .unwrap()
            .on_excite_from(|n| {
                std::future::ready(Err(CallbackError::new(format!("bad {n}"))))
            });
        let mut stream = machine.subscribe();

        let err = machine.dispatch(3u8).await.unwrap_err();

        assert!(matches!(
            err,
            MachineError::CallbackFailure {
                phase: CallbackPhase::Excite,
                ..
            }
        ));
        assert!(err.to_string().contains("bad 3"));
        assert_eq!(machine.current_state(), Stance::Walk);
        assert!(stream.try_next().is_none());

        machine.dispatch(4u8).await.unwrap();
        assert_eq!(machine.current_state(), Stance::Run);
    }

    #[test]
    fn concurrent_configure_creates_one_configuration() {
        let machine = Arc::new(StateMachine::new(Stance::Idle));
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let machine = Arc::clone(&machine);
                std::thread::spawn(move || machine.configure(Stance::Jump).unwrap())
            })
            .collect();
        let configs: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();

        assert!(configs.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(machine.registry.read().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dispose_rejects_further_operations() {
        let machine = StateMachine::new(Stance::Idle);
        let kept = machine.configure(Stance::Walk).unwrap();
        let mut stream = machine.subscribe();

        machine.dispose().await.unwrap();

        assert_eq!(machine.status(), MachineStatus::Disposed);
        assert!(stream.next_transition().await.is_none());
        assert!(machine.subscribe().next_transition().await.is_none());
        assert!(machine.dispatch(1u8).await.unwrap_err().is_disposed());
        assert!(machine.transition_to(Stance::Run).await.unwrap_err().is_disposed());
        assert!(machine.excite(Stance::Idle).await.unwrap_err().is_disposed());
        assert!(machine.dispose().await.unwrap_err().is_disposed());
        assert!(machine
            .set_parent(Stance::Walk, Some(Stance::Move))
            .unwrap_err()
            .is_disposed());
        assert!(matches!(
            machine.configure(Stance::Idle),
            Err(MachineError::AlreadyDisposed)
        ));
        assert!(matches!(
            machine.configure(Stance::Walk),
            Err(MachineError::AlreadyDisposed)
        ));
        assert!(matches!(
            machine.table_for::<&str>(Stance::Idle),
            Err(MachineError::AlreadyDisposed)
        ));
        assert!(machine.registry.read().unwrap().is_empty());
        assert_eq!(kept.state(), &Stance::Walk);
        assert_eq!(machine.current_state(), Stance::Idle);
    }

    #[tokio::test]
    async fn transitions_do_not_populate_the_registry() {
        let machine = StateMachine::new(Stance::Idle);
        machine.set_parent(Stance::Walk, Some(Stance::Move)).unwrap();

        machine.transition_to(Stance::Walk).await.unwrap();
        machine.excite(Stance::Move).await.unwrap();
        assert!(machine.dispatch('q').await.unwrap().is_none());

        assert!(machine.registry.read().unwrap().is_empty());
    }

    #[test]
    fn cyclic_parent_is_rejected() {
        let machine = StateMachine::new(Stance::Idle);
        machine.set_parent(Stance::Walk, Some(Stance::Move)).unwrap();

        let err = machine
            .set_parent(Stance::Move, Some(Stance::Walk))
            .unwrap_err();
        assert!(matches!(err, MachineError::Hierarchy(_)));
        assert_eq!(machine.parent_of(&Stance::Move), None);
    }

    #[test]
    fn configure_returns_the_same_configuration() {
        let machine = StateMachine::new(Stance::Idle);
        let first = machine.configure(Stance::Run).unwrap();
        let second = machine.configure(Stance::Run).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MachineConfig::default().with_name("");
        assert!(StateMachine::with_config(Stance::Idle, config).is_err());
    }
}
