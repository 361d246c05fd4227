#![forbid(unsafe_code)]

//! Host loop and test harness for controlled fields.
//!
//! [`FieldHarness`] plays the part of a UI framework: it renders the field,
//! runs the reconcile step after each render, and keeps cycling while the
//! local state has pending writes.

pub mod error;
pub mod field;

pub use error::{HarnessError, Result};
pub use field::{FieldHarness, HarnessConfig};
