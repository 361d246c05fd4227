#![forbid(unsafe_code)]

//! Core: local state cells, equality comparators, and the controlled-state
//! synchronizer.
//!
//! # Example
//!
//! ```
//! use cstate_core::{Reconciliation, Synchronizer};
//!
//! let number_text = Synchronizer::new(
//!     |value: &f64| value.to_string(),
//!     |text: &String| text.parse().unwrap_or(f64::NAN),
//! );
//!
//! let mut field = number_text.create(&1.23);
//! let (text, set_text) = field.render();
//! assert_eq!(text, "1.23");
//!
//! // The first reconcile only records the snapshot.
//! assert_eq!(field.reconcile(&1.23, |_| {}), Reconciliation::Unchanged);
//!
//! // A local edit is notified on the next reconcile.
//! set_text.set("1.230".to_string());
//! let mut notified = None;
//! let outcome = field.reconcile(&1.23, |value| notified = Some(value));
//! assert_eq!(outcome, Reconciliation::Notified);
//! assert_eq!(notified, Some(1.23));
//! assert_eq!(field.state(), "1.230");
//! ```

pub mod equality;
pub mod options;
pub mod state;
pub mod synchronizer;

pub use equality::{Equality, SameValue};
pub use options::SyncOptions;
pub use state::{SetState, StateCell, Subscription};
pub use synchronizer::{ControlledState, Reconciliation, Synchronizer};
