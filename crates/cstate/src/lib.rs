#![forbid(unsafe_code)]

//! cstate public facade crate.
//!
//! A controlled field keeps an editable local state (text, say) in step with
//! a value owned by its parent (a number), reporting local edits back to the
//! parent and following parent changes without clobbering equivalent edits.

pub use cstate_core::{
    ControlledState, Equality, Reconciliation, SameValue, SetState, StateCell, Subscription,
    SyncOptions, Synchronizer,
};

pub mod prelude {
    pub use cstate_core as core;
    #[cfg(feature = "harness")]
    pub use cstate_harness as harness;

    pub use cstate_core::{Equality, Reconciliation, SetState, SyncOptions, Synchronizer};
    #[cfg(feature = "harness")]
    pub use cstate_harness::{FieldHarness, HarnessConfig};
}
