#![forbid(unsafe_code)]

//! Injectable equality comparators.
//!
//! The synchronizer never uses `==` directly. It asks an [`Equality<T>`]
//! whether two values are the same, so callers can compare by key, by
//! tolerance, or by identity instead of structural equality.

use std::fmt;
use std::rc::Rc;

/// A cloneable equality comparator over `T`.
pub struct Equality<T> {
    eq: Rc<dyn Fn(&T, &T) -> bool>,
    label: &'static str,
}

impl<T> Clone for Equality<T> {
    fn clone(&self) -> Self {
        Self {
            eq: Rc::clone(&self.eq),
            label: self.label,
        }
    }
}

impl<T> fmt::Debug for Equality<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Equality").field(&self.label).finish()
    }
}

impl<T: 'static> Equality<T> {
    /// Wrap a custom comparator.
    ///
    /// The synchronizer always passes the newer value first and the
    /// previous (or reference) value second.
    #[must_use]
    pub fn new(eq: impl Fn(&T, &T) -> bool + 'static) -> Self {
        Self {
            eq: Rc::new(eq),
            label: "custom",
        }
    }

    /// Reflexive [`PartialEq`]: `a == b`, or both values are unequal to
    /// themselves (`NaN` and anything containing one). This is the default.
    ///
    /// Unlike [`Equality::same_value`], `0.0` and `-0.0` compare equal.
    #[must_use]
    pub fn identity() -> Self
    where
        T: PartialEq,
    {
        #[allow(clippy::eq_op)]
        let eq = |a: &T, b: &T| a == b || (a != a && b != b);
        Self {
            eq: Rc::new(eq),
            label: "identity",
        }
    }

    /// Plain IEEE-style [`PartialEq`]; `NaN` never equals itself.
    #[must_use]
    pub fn partial_eq() -> Self
    where
        T: PartialEq,
    {
        Self {
            eq: Rc::new(|a: &T, b: &T| a == b),
            label: "partial_eq",
        }
    }

    /// Identity equality for floats: `NaN` equals `NaN`, `0.0` differs
    /// from `-0.0`.
    #[must_use]
    pub fn same_value() -> Self
    where
        T: SameValue,
    {
        Self {
            eq: Rc::new(|a: &T, b: &T| a.same_value(b)),
            label: "same_value",
        }
    }

    /// A comparator that never reports equality.
    #[must_use]
    pub fn always_different() -> Self {
        Self {
            eq: Rc::new(|_: &T, _: &T| false),
            label: "always_different",
        }
    }

    /// Compare `a` (newer) against `b` (previous).
    #[must_use]
    pub fn equal(&self, a: &T, b: &T) -> bool {
        (self.eq)(a, b)
    }
}

impl<T: PartialEq + 'static> Default for Equality<T> {
    fn default() -> Self {
        Self::identity()
    }
}

/// Identity comparison, distinct from IEEE `==` for floats.
pub trait SameValue {
    fn same_value(&self, other: &Self) -> bool;
}

impl SameValue for f64 {
    fn same_value(&self, other: &Self) -> bool {
        (self.is_nan() && other.is_nan()) || self.to_bits() == other.to_bits()
    }
}

impl SameValue for f32 {
    fn same_value(&self, other: &Self) -> bool {
        (self.is_nan() && other.is_nan()) || self.to_bits() == other.to_bits()
    }
}

impl<T: SameValue> SameValue for Option<T> {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_value(b),
            (None, None) => true,
            _ => false,
        }
    }
}
