#![forbid(unsafe_code)]

//! A deterministic render loop for a single controlled field.
//!
//! # Cycle
//!
//! One cycle is a render (read `(state, set_state)`) followed by the
//! reconcile step against the current external value. A write to the local
//! state, whether from [`FieldHarness::act`], from a resync, or from a
//! notification handler, marks the field dirty; the harness then runs
//! another cycle. Settling stops once a cycle finishes with nothing pending.
//!
//! # Invariants
//!
//! 1. Cycles are strictly sequential; reconcile N sees the snapshot written
//!    by reconcile N-1.
//! 2. [`FieldHarness::rerender`] always runs at least one cycle;
//!    [`FieldHarness::act`] runs cycles only if the closure wrote the state.
//! 3. A settle pass runs at most [`HarnessConfig::max_cycles`] cycles.
//!
//! # Echoing parent
//!
//! With [`HarnessConfig::echo_parent`], each notified value becomes the next
//! external value, as a parent that stores whatever its child reports.
//! The parent only re-renders when the notified value differs from the
//! current one under the field's `equal_value`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use cstate_core::{ControlledState, Reconciliation, SetState, Subscription, Synchronizer};

use crate::error::{HarnessError, Result};

/// Default bound on cycles per settle pass.
pub const DEFAULT_MAX_CYCLES: usize = 64;

/// Harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Cycles allowed in one settle pass before giving up (at least 1).
    pub max_cycles: usize,
    /// Feed every notification back as the external value.
    pub echo_parent: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            echo_parent: false,
        }
    }
}

impl HarnessConfig {
    #[must_use]
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles.max(1);
        self
    }

    #[must_use]
    pub fn with_echo_parent(mut self, echo_parent: bool) -> Self {
        self.echo_parent = echo_parent;
        self
    }
}

/// Drives one [`ControlledState`] through render/reconcile cycles.
pub struct FieldHarness<V, S> {
    field: ControlledState<V, S>,
    value: V,
    rendered: S,
    set_state: SetState<S>,
    dirty: Rc<Cell<bool>>,
    _subscription: Subscription,
    notifications: Vec<V>,
    outcomes: Vec<Reconciliation>,
    cycles: u64,
    config: HarnessConfig,
}

impl<V: fmt::Debug, S: fmt::Debug> fmt::Debug for FieldHarness<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHarness")
            .field("value", &self.value)
            .field("rendered", &self.rendered)
            .field("notifications", &self.notifications)
            .field("cycles", &self.cycles)
            .field("config", &self.config)
            .finish()
    }
}

impl<V: Clone + 'static, S: Clone + 'static> FieldHarness<V, S> {
    /// Create a field for `value` and run its first cycle, which only
    /// records the snapshot.
    pub fn mount(sync: &Synchronizer<V, S>, value: V) -> Result<Self> {
        Self::mount_with_config(sync, value, HarnessConfig::default())
    }

    pub fn mount_with_config(
        sync: &Synchronizer<V, S>,
        value: V,
        config: HarnessConfig,
    ) -> Result<Self> {
        let field = sync.create(&value);
        let dirty = Rc::new(Cell::new(false));
        let dirty_flag = Rc::clone(&dirty);
        let subscription = field.subscribe(move |_| dirty_flag.set(true));
        let (rendered, set_state) = field.render();

        let mut harness = Self {
            field,
            value,
            rendered,
            set_state,
            dirty,
            _subscription: subscription,
            notifications: Vec::new(),
            outcomes: Vec::new(),
            cycles: 0,
            config: HarnessConfig {
                max_cycles: config.max_cycles.max(1),
                ..config
            },
        };
        harness.settle(true)?;
        Ok(harness)
    }

    /// Supply a new external value and settle.
    pub fn rerender(&mut self, value: V) -> Result<()> {
        self.value = value;
        self.settle(true)
    }

    /// Run `f` with the current setter, then settle.
    pub fn act(&mut self, f: impl FnOnce(&SetState<S>)) -> Result<()> {
        f(&self.set_state);
        self.settle(false)
    }

    /// State returned by the most recent render.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.rendered
    }

    /// Current external value.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Setter returned by the most recent render.
    #[must_use]
    pub fn set_state(&self) -> SetState<S> {
        self.set_state.clone()
    }

    /// Every notified value, oldest first.
    #[must_use]
    pub fn notifications(&self) -> &[V] {
        &self.notifications
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    #[must_use]
    pub fn last_notification(&self) -> Option<&V> {
        self.notifications.last()
    }

    /// Outcome of every reconcile step, oldest first.
    #[must_use]
    pub fn outcomes(&self) -> &[Reconciliation] {
        &self.outcomes
    }

    /// Total cycles run since mount.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn config(&self) -> HarnessConfig {
        self.config
    }

    #[must_use]
    pub fn field(&self) -> &ControlledState<V, S> {
        &self.field
    }

    /// Unmount, returning the field.
    #[must_use]
    pub fn into_field(self) -> ControlledState<V, S> {
        self.field
    }

    fn settle(&mut self, force: bool) -> Result<()> {
        let span = tracing::debug_span!(
            "cstate.settle",
            force,
            cycles_run = tracing::field::Empty
        );
        let _enter = span.enter();

        let mut run = force || self.dirty.get();
        let mut ran = 0usize;
        while run {
            if ran == self.config.max_cycles {
                tracing::warn!(
                    limit = self.config.max_cycles,
                    total_cycles = self.cycles,
                    "field did not settle"
                );
                return Err(HarnessError::cycle_limit(self.config.max_cycles));
            }
            self.dirty.set(false);
            self.cycle();
            ran += 1;
            run = self.dirty.get();
        }

        span.record("cycles_run", ran);
        Ok(())
    }

    fn cycle(&mut self) {
        let (rendered, set_state) = self.field.render();
        self.rendered = rendered;
        self.set_state = set_state;
        self.cycles += 1;

        let mut notified = None;
        let outcome = self.field.reconcile(&self.value, |value| notified = Some(value));
        self.outcomes.push(outcome);

        let Some(value) = notified else {
            return;
        };
        if self.config.echo_parent {
            let equal_value = &self.field.synchronizer().options().equal_value;
            if !equal_value.equal(&value, &self.value) {
                self.value = value.clone();
                self.dirty.set(true);
            }
        }
        self.notifications.push(value);
    }
}
