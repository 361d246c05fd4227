#![forbid(unsafe_code)]

//! Version-tracked local state with detachable setter handles.
//!
//! [`StateCell<S>`] is the local-state primitive a controlled field is built
//! on: a shared, single-threaded value that can be overwritten through a
//! [`SetState`] handle and observed through [`Subscription`] callbacks.
//!
//! # Architecture
//!
//! The value lives in `Rc<RefCell<..>>`. Setter handles hold a `Weak`
//! reference so a handle that outlives its field becomes inert instead of
//! keeping the state alive. Subscribers are stored as `Weak` callbacks and
//! pruned lazily during notification.
//!
//! # Invariants
//!
//! 1. Every write bumps the version by exactly one. There is no equality
//!    bail-out: deciding whether a write is a "change" belongs to the
//!    synchronizer's comparators, not to the cell.
//! 2. Subscribers are called in registration order, after the write has
//!    completed and with no borrow held, so a callback may read or write the
//!    cell again.
//! 3. Dropping a [`Subscription`] removes the callback before the next write.
//!
//! # Panics
//!
//! The updater passed to [`StateCell::update`] runs while the cell is
//! immutably borrowed. Writing to the same cell from inside the updater
//! panics (re-entrant borrow).

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback = dyn Fn(u64);

struct StateInner<S> {
    value: S,
    /// Bumped once per write.
    version: u64,
    subscribers: Vec<Weak<Callback>>,
}

/// A shared, version-tracked local state value.
///
/// Cloning a `StateCell` creates a new handle to the **same** value.
pub struct StateCell<S> {
    inner: Rc<RefCell<StateInner<S>>>,
}

impl<S> Clone for StateCell<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for StateCell<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StateCell")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<S> StateCell<S> {
    /// Create a cell holding `value` at version 0.
    #[must_use]
    pub fn new(value: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StateInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> S
    where
        S: Clone,
    {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of writes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: S) {
        write(&self.inner, value);
    }

    /// Replace the value with `f(current)` and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&S) -> S) {
        update(&self.inner, f);
    }

    /// A detachable setter for this cell.
    #[must_use]
    pub fn setter(&self) -> SetState<S> {
        SetState {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Register a callback invoked with the new version after every write.
    ///
    /// The callback stays registered for as long as the returned
    /// [`Subscription`] is alive.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(u64) + 'static) -> Subscription {
        let callback: Rc<Callback> = Rc::new(callback);
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|weak| weak.strong_count() > 0);
        inner.subscribers.push(Rc::downgrade(&callback));
        drop(inner);
        Subscription {
            _callback: callback,
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

fn update<S>(inner: &Rc<RefCell<StateInner<S>>>, f: impl FnOnce(&S) -> S) {
    let next = f(&inner.borrow().value);
    write(inner, next);
}

fn write<S>(inner: &Rc<RefCell<StateInner<S>>>, value: S) {
    let (version, callbacks) = {
        let mut guard = inner.borrow_mut();
        guard.value = value;
        guard.version += 1;
        guard.subscribers.retain(|weak| weak.strong_count() > 0);
        let callbacks: Vec<Rc<Callback>> =
            guard.subscribers.iter().filter_map(Weak::upgrade).collect();
        (guard.version, callbacks)
    };
    for callback in callbacks {
        callback(version);
    }
}

/// Setter handle returned alongside the state on every render.
///
/// Handles are cheap to clone and do not keep the state alive. Writing
/// through a handle whose field has been dropped does nothing.
pub struct SetState<S> {
    inner: Weak<RefCell<StateInner<S>>>,
}

impl<S> Clone for SetState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for SetState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl<S> SetState<S> {
    /// Overwrite the local state.
    pub fn set(&self, value: S) {
        match self.inner.upgrade() {
            Some(inner) => write(&inner, value),
            None => Self::log_detached(),
        }
    }

    /// Overwrite the local state with `f(current)`.
    pub fn update(&self, f: impl FnOnce(&S) -> S) {
        match self.inner.upgrade() {
            Some(inner) => update(&inner, f),
            None => Self::log_detached(),
        }
    }

    /// Whether the state this handle writes to still exists.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn log_detached() {
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "cstate.set_detached");
    }
}

/// RAII guard for a [`StateCell::subscribe`] callback.
pub struct Subscription {
    _callback: Rc<Callback>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
