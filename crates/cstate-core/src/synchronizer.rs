#![forbid(unsafe_code)]

//! Controlled local state: a parent-owned value `V` mirrored into an
//! independently editable local state `S`.
//!
//! A [`Synchronizer`] bundles the `convert: V -> S` / `invert: S -> V` pair
//! with its [`SyncOptions`]. Each controlled field gets its own
//! [`ControlledState`] from [`Synchronizer::create`], which the host drives
//! once per cycle:
//!
//! 1. **render**: [`ControlledState::render`] hands out `(state, setter)`.
//! 2. **commit**, then **reconcile**: [`ControlledState::reconcile`] compares
//!    the current value and state against the previous cycle and either
//!    notifies the owner, resynchronizes the state, or does nothing.
//!
//! # Reconciliation rule
//!
//! | Local state changed | Value changed | `invert(state) == value` | Action                               |
//! |---------------------|---------------|--------------------------|--------------------------------------|
//! | yes                 | any           | any                      | `on_change(invert(state))`           |
//! | no                  | yes           | yes                      | none (keep the user's formatting)    |
//! | no                  | yes           | no                       | `state = convert(value)`             |
//! | no                  | no            | any                      | none                                 |
//!
//! A local edit is always notified, even when it maps to the current value:
//! the owner may not have applied the previous notification yet, and
//! skipping it could drop the edit.
//!
//! # Invariants
//!
//! 1. The local state starts as `convert(initial value)`. The first
//!    reconcile is the mount: it records the snapshot and returns
//!    [`Reconciliation::Unchanged`] without calling any comparator,
//!    conversion, or `on_change`.
//! 2. At most one branch acts per cycle; a local edit wins over a value
//!    change observed in the same cycle.
//! 3. The snapshot advances on every reconcile, before any comparator or
//!    conversion runs.
//! 4. No borrow is held while user closures run, so `on_change` may write
//!    through the field's [`SetState`].
//!
//! # Failure Modes
//!
//! - **User closure panics**: the panic unwinds out of `reconcile`. The
//!   snapshot has already advanced; nothing is retried.
//! - **Comparators that never agree** (e.g. [`Equality::partial_eq`] on
//!   `NaN`): the field may resynchronize every cycle. The default
//!   comparator treats `NaN` as equal to itself.
//!
//! [`Equality::partial_eq`]: crate::equality::Equality::partial_eq

use std::fmt;
use std::rc::Rc;

use crate::options::SyncOptions;
use crate::state::{SetState, StateCell, Subscription};

/// What a single [`ControlledState::reconcile`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reconciliation {
    /// Neither the value nor the state changed.
    Unchanged,
    /// The local state changed; the owner was notified with `invert(state)`.
    Notified,
    /// The value changed but the state already represents it.
    AlreadySynced,
    /// The value changed; the state was replaced with `convert(value)`.
    Resynced,
}

impl Reconciliation {
    /// Whether this reconcile wrote the local state (and so needs another
    /// cycle).
    #[must_use]
    pub const fn wrote_state(self) -> bool {
        matches!(self, Self::Resynced)
    }

    /// Whether the owner was notified.
    #[must_use]
    pub const fn notified(self) -> bool {
        matches!(self, Self::Notified)
    }

    /// Stable name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Notified => "notified",
            Self::AlreadySynced => "already_synced",
            Self::Resynced => "resynced",
        }
    }
}

/// Factory for controlled fields mapping a value `V` to a local state `S`.
///
/// Cloning a `Synchronizer` shares the conversion functions and options.
pub struct Synchronizer<V, S> {
    convert: Rc<dyn Fn(&V) -> S>,
    invert: Rc<dyn Fn(&S) -> V>,
    options: SyncOptions<V, S>,
}

impl<V, S> Clone for Synchronizer<V, S> {
    fn clone(&self) -> Self {
        Self {
            convert: Rc::clone(&self.convert),
            invert: Rc::clone(&self.invert),
            options: self.options.clone(),
        }
    }
}

impl<V, S> fmt::Debug for Synchronizer<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<V: Clone + 'static, S: Clone + 'static> Synchronizer<V, S> {
    /// Create a synchronizer comparing values and states with
    /// [`Equality::identity`](crate::equality::Equality::identity).
    #[must_use]
    pub fn new(
        convert: impl Fn(&V) -> S + 'static,
        invert: impl Fn(&S) -> V + 'static,
    ) -> Self
    where
        V: PartialEq,
        S: PartialEq,
    {
        Self::with_options(convert, invert, SyncOptions::default())
    }

    /// Create a synchronizer with explicit comparators.
    #[must_use]
    pub fn with_options(
        convert: impl Fn(&V) -> S + 'static,
        invert: impl Fn(&S) -> V + 'static,
        options: SyncOptions<V, S>,
    ) -> Self {
        Self {
            convert: Rc::new(convert),
            invert: Rc::new(invert),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> &SyncOptions<V, S> {
        &self.options
    }

    /// Map a value into the local state space.
    #[must_use]
    pub fn convert(&self, value: &V) -> S {
        (self.convert)(value)
    }

    /// Map a local state back into the value space.
    #[must_use]
    pub fn invert(&self, state: &S) -> V {
        (self.invert)(state)
    }

    /// Create the controlled state for one field, initialized from `value`.
    #[must_use]
    pub fn create(&self, value: &V) -> ControlledState<V, S> {
        let state = self.convert(value);
        ControlledState {
            sync: self.clone(),
            cell: StateCell::new(state.clone()),
            prev_value: value.clone(),
            prev_state: state,
            cycles: 0,
            mounted: false,
        }
    }
}

/// The per-field instance: local state plus the previous cycle's snapshot.
///
/// The snapshot is owned exclusively by this instance and reset only by
/// creating a new one.
pub struct ControlledState<V, S> {
    sync: Synchronizer<V, S>,
    cell: StateCell<S>,
    prev_value: V,
    prev_state: S,
    cycles: u64,
    mounted: bool,
}

impl<V: fmt::Debug, S: fmt::Debug> fmt::Debug for ControlledState<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlledState")
            .field("cell", &self.cell)
            .field("prev_value", &self.prev_value)
            .field("prev_state", &self.prev_state)
            .field("cycles", &self.cycles)
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl<V: Clone + 'static, S: Clone + 'static> ControlledState<V, S> {
    /// The `(state, set_state)` pair for this cycle's render.
    #[must_use]
    pub fn render(&self) -> (S, SetState<S>) {
        (self.cell.get(), self.cell.setter())
    }

    /// Current local state.
    #[must_use]
    pub fn state(&self) -> S {
        self.cell.get()
    }

    /// Access the current local state by reference.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.cell.with(f)
    }

    #[must_use]
    pub fn setter(&self) -> SetState<S> {
        self.cell.setter()
    }

    /// Observe writes to the local state. Hosts use this to schedule the
    /// next cycle.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(u64) + 'static) -> Subscription {
        self.cell.subscribe(callback)
    }

    /// Number of writes to the local state since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.cell.version()
    }

    /// Number of reconcile steps run so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether the mount reconcile has run.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn synchronizer(&self) -> &Synchronizer<V, S> {
        &self.sync
    }

    /// Post-commit reconcile step for one cycle.
    ///
    /// `value` is the external value supplied for this cycle. `on_change` is
    /// called at most once, with `invert(state)`, when the local state
    /// changed since the previous cycle. The first call only records the
    /// snapshot.
    ///
    /// Must be called once per cycle, after the render that produced the
    /// current state and before any further write to it.
    pub fn reconcile(&mut self, value: &V, on_change: impl FnOnce(V)) -> Reconciliation {
        let state = self.cell.get();
        let prev_value = std::mem::replace(&mut self.prev_value, value.clone());
        let prev_state = std::mem::replace(&mut self.prev_state, state.clone());
        self.cycles += 1;
        let mounting = !std::mem::replace(&mut self.mounted, true);

        let options = &self.sync.options;
        let outcome = if mounting {
            Reconciliation::Unchanged
        } else if !options.equal_state.equal(&state, &prev_state) {
            on_change(self.sync.invert(&state));
            Reconciliation::Notified
        } else if !options.equal_value.equal(value, &prev_value) {
            if options.equal_value.equal(&self.sync.invert(&state), value) {
                Reconciliation::AlreadySynced
            } else {
                self.cell.set(self.sync.convert(value));
                Reconciliation::Resynced
            }
        } else {
            Reconciliation::Unchanged
        };

        #[cfg(feature = "tracing")]
        self.log_outcome(outcome);

        outcome
    }

    #[cfg(feature = "tracing")]
    fn log_outcome(&self, outcome: Reconciliation) {
        let cycle = self.cycles;
        let version = self.cell.version();
        match outcome {
            Reconciliation::Unchanged => {
                tracing::trace!(message = "cstate.unchanged", cycle, version);
            }
            Reconciliation::Notified => {
                tracing::debug!(message = "cstate.notify", cycle, version);
            }
            Reconciliation::AlreadySynced => {
                tracing::debug!(message = "cstate.already_synced", cycle, version);
            }
            Reconciliation::Resynced => {
                tracing::debug!(message = "cstate.resync", cycle, version);
            }
        }
    }
}
