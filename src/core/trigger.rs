//! Trigger kinds and resolution outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a resolved rule instructs the machine to do.
///
/// Exactly one kind is produced per resolution and it fully determines the
/// side effects of a `dispatch`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Defer to the ancestor state's table.
    Ignore,

    /// Change state and run the full exit/entry sequence.
    Transition,

    /// Keep the current state and run excite callbacks only.
    Excite,

    /// Stop resolution here without changing state.
    Intercept,

    /// Change state without running entry or exit callbacks.
    NoProcess,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ignore => "ignore",
            Self::Transition => "transition",
            Self::Excite => "excite",
            Self::Intercept => "intercept",
            Self::NoProcess => "no-process",
        };
        f.write_str(name)
    }
}

/// Outcome of resolving a payload value against a transition table.
///
/// Kinds that carry a target state hold it; `Ignore` and `Intercept` do not
/// need one, so no "default state" value is ever required.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Resolution<S> {
    Ignore,
    Intercept,
    Transition(S),
    Excite(S),
    NoProcess(S),
}

impl<S> Resolution<S> {
    /// Build a resolution from a `(target, kind)` pair.
    ///
    /// The target is dropped for `Ignore` and `Intercept`.
    ///
    /// ```rust
    /// use statetree::core::{Resolution, TriggerKind};
    ///
    /// let jump = Resolution::from_parts("Jump", TriggerKind::Transition);
    /// assert_eq!(jump, Resolution::Transition("Jump"));
    ///
    /// let ignored = Resolution::from_parts("Jump", TriggerKind::Ignore);
    /// assert!(ignored.is_ignore());
    /// ```
    pub fn from_parts(target: S, kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::Ignore => Self::Ignore,
            TriggerKind::Intercept => Self::Intercept,
            TriggerKind::Transition => Self::Transition(target),
            TriggerKind::Excite => Self::Excite(target),
            TriggerKind::NoProcess => Self::NoProcess(target),
        }
    }

    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::Ignore => TriggerKind::Ignore,
            Self::Intercept => TriggerKind::Intercept,
            Self::Transition(_) => TriggerKind::Transition,
            Self::Excite(_) => TriggerKind::Excite,
            Self::NoProcess(_) => TriggerKind::NoProcess,
        }
    }

    /// Target state, if this kind carries one.
    pub fn target(&self) -> Option<&S> {
        match self {
            Self::Transition(s) | Self::Excite(s) | Self::NoProcess(s) => Some(s),
            Self::Ignore | Self::Intercept => None,
        }
    }

    pub fn is_ignore(&self) -> bool {
        matches!(self, Self::Ignore)
    }
}

impl<S> Default for Resolution<S> {
    fn default() -> Self {
        Self::Ignore
    }
}
