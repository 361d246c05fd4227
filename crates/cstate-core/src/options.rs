#![forbid(unsafe_code)]

//! Comparator configuration for a [`Synchronizer`](crate::Synchronizer).

use std::fmt;

use crate::equality::Equality;

/// Equality options for a synchronizer.
///
/// | Field         | Compares            | Default                        |
/// |---------------|---------------------|--------------------------------|
/// | `equal_value` | external values `V` | [`Equality::identity`] on `V`  |
/// | `equal_state` | local states `S`    | [`Equality::identity`] on `S`  |
///
/// `identity` is `PartialEq` made reflexive, so a `NaN` value equals itself.
///
/// Types without `PartialEq` have no default and must supply both through
/// [`SyncOptions::new`].
pub struct SyncOptions<V, S> {
    /// Decides whether the external value changed, and whether the local
    /// state already represents it.
    pub equal_value: Equality<V>,
    /// Decides whether the local state changed since the last cycle.
    pub equal_state: Equality<S>,
}

impl<V, S> Clone for SyncOptions<V, S> {
    fn clone(&self) -> Self {
        Self {
            equal_value: self.equal_value.clone(),
            equal_state: self.equal_state.clone(),
        }
    }
}

impl<V, S> fmt::Debug for SyncOptions<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("equal_value", &self.equal_value)
            .field("equal_state", &self.equal_state)
            .finish()
    }
}

impl<V, S> SyncOptions<V, S> {
    #[must_use]
    pub fn new(equal_value: Equality<V>, equal_state: Equality<S>) -> Self {
        Self {
            equal_value,
            equal_state,
        }
    }

    /// Replace the value comparator.
    #[must_use]
    pub fn with_equal_value(mut self, equal_value: Equality<V>) -> Self {
        self.equal_value = equal_value;
        self
    }

    /// Replace the state comparator.
    #[must_use]
    pub fn with_equal_state(mut self, equal_state: Equality<S>) -> Self {
        self.equal_state = equal_state;
        self
    }
}

impl<V, S> Default for SyncOptions<V, S>
where
    V: PartialEq + 'static,
    S: PartialEq + 'static,
{
    fn default() -> Self {
        Self::new(Equality::identity(), Equality::identity())
    }
}
