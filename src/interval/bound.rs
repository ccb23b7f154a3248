//! One-sided interval endpoints.

/// A one-sided limit of an [`crate::interval::Interval`].
///
/// A bound carries no side of its own: whether it acts as a lower or an upper limit is
/// decided by where it is stored in the interval and by which
/// [`crate::interval::IntervalComparer`] ordering is applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound<T> {
    /// No limit on this side (`-∞` as a lower bound, `+∞` as an upper bound)
    Unbounded,
    /// The limit value itself belongs to the interval
    Inclusive(T),
    /// The limit value itself is excluded from the interval
    Exclusive(T),
}

impl<T> Bound<T> {
    /// Returns the limit value, or `None` for [`Bound::Unbounded`].
    pub fn value(&self) -> Option<&T> {
        match self {
            Bound::Unbounded => None,
            Bound::Inclusive(value) | Bound::Exclusive(value) => Some(value),
        }
    }

    /// Returns true for [`Bound::Unbounded`].
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Bound::Unbounded)
    }

    /// Returns true for [`Bound::Inclusive`].
    pub fn is_inclusive(&self) -> bool {
        matches!(self, Bound::Inclusive(_))
    }

    /// Returns true for [`Bound::Exclusive`].
    pub fn is_exclusive(&self) -> bool {
        matches!(self, Bound::Exclusive(_))
    }

    /// Converts `&Bound<T>` to `Bound<&T>`.
    pub fn as_ref(&self) -> Bound<&T> {
        match self {
            Bound::Unbounded => Bound::Unbounded,
            Bound::Inclusive(value) => Bound::Inclusive(value),
            Bound::Exclusive(value) => Bound::Exclusive(value),
        }
    }

    /// Maps the limit value, keeping the bound kind.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Bound<U> {
        match self {
            Bound::Unbounded => Bound::Unbounded,
            Bound::Inclusive(value) => Bound::Inclusive(f(value)),
            Bound::Exclusive(value) => Bound::Exclusive(f(value)),
        }
    }
}

impl<T: Clone> Bound<T> {
    /// Returns the bound on the other side of the same limit value.
    ///
    /// `[5` becomes `5)` and `(5` becomes `5]`: the complement starts or ends exactly where
    /// this bound leaves off. An unbounded side has no complement.
    pub fn complement(&self) -> Option<Bound<T>> {
        match self {
            Bound::Unbounded => None,
            Bound::Inclusive(value) => Some(Bound::Exclusive(value.clone())),
            Bound::Exclusive(value) => Some(Bound::Inclusive(value.clone())),
        }
    }
}

impl<T> From<std::ops::Bound<T>> for Bound<T> {
    fn from(bound: std::ops::Bound<T>) -> Self {
        match bound {
            std::ops::Bound::Unbounded => Bound::Unbounded,
            std::ops::Bound::Included(value) => Bound::Inclusive(value),
            std::ops::Bound::Excluded(value) => Bound::Exclusive(value),
        }
    }
}
