//! Endpoint orderings shared by intervals, sets and maps.
//!
//! Lower and upper bounds order differently at equal values: an exclusive lower bound
//! starts after an inclusive one, an exclusive upper bound ends before an inclusive one.
//! Unbounded lower bounds precede everything, unbounded upper bounds follow everything.

use std::cmp::Ordering;

use crate::interval::Bound;

/// Comparison rules for interval endpoints over an ordered value type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalComparer;

impl IntervalComparer {
    /// Orders two bounds used as lower limits by where their intervals start.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    /// use x86scope::interval::{Bound, IntervalComparer};
    ///
    /// let inclusive = Bound::Inclusive(5);
    /// let exclusive = Bound::Exclusive(5);
    /// assert_eq!(IntervalComparer::compare_lower(&inclusive, &exclusive), Ordering::Less);
    /// assert_eq!(IntervalComparer::compare_lower(&Bound::Unbounded, &inclusive), Ordering::Less);
    /// ```
    pub fn compare_lower<T: Ord>(left: &Bound<T>, right: &Bound<T>) -> Ordering {
        match (left.value(), right.value()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(l), Some(r)) => l
                .cmp(r)
                .then_with(|| left.is_exclusive().cmp(&right.is_exclusive())),
        }
    }

    /// Orders two bounds used as upper limits by where their intervals end.
    pub fn compare_upper<T: Ord>(left: &Bound<T>, right: &Bound<T>) -> Ordering {
        match (left.value(), right.value()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(l), Some(r)) => l
                .cmp(r)
                .then_with(|| left.is_inclusive().cmp(&right.is_inclusive())),
        }
    }

    /// Returns true if no value lies at or after `lower` and at or before `upper`.
    ///
    /// At equal limit values only two inclusive bounds admit a value (`[v;v]`); any
    /// exclusive side puts `lower` after `upper`. An unbounded side never does.
    pub fn lower_after_upper<T: Ord>(lower: &Bound<T>, upper: &Bound<T>) -> bool {
        match (lower.value(), upper.value()) {
            (Some(l), Some(u)) => match l.cmp(u) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => !(lower.is_inclusive() && upper.is_inclusive()),
            },
            _ => false,
        }
    }

    /// Returns true if `upper` ends exactly where `lower` begins, with no value between
    /// and no value shared: `5]` touches `(5`, and `5)` touches `[5`.
    pub fn touching<T: Ord>(upper: &Bound<T>, lower: &Bound<T>) -> bool {
        match (upper.value(), lower.value()) {
            (Some(u), Some(l)) => u == l && upper.is_inclusive() != lower.is_inclusive(),
            _ => false,
        }
    }

    /// Returns the bound that starts later.
    pub fn max_lower<'a, T: Ord>(left: &'a Bound<T>, right: &'a Bound<T>) -> &'a Bound<T> {
        if Self::compare_lower(left, right) == Ordering::Less {
            right
        } else {
            left
        }
    }

    /// Returns the bound that starts earlier.
    pub fn min_lower<'a, T: Ord>(left: &'a Bound<T>, right: &'a Bound<T>) -> &'a Bound<T> {
        if Self::compare_lower(left, right) == Ordering::Greater {
            right
        } else {
            left
        }
    }

    /// Returns the bound that ends later.
    pub fn max_upper<'a, T: Ord>(left: &'a Bound<T>, right: &'a Bound<T>) -> &'a Bound<T> {
        if Self::compare_upper(left, right) == Ordering::Less {
            right
        } else {
            left
        }
    }

    /// Returns the bound that ends earlier.
    pub fn min_upper<'a, T: Ord>(left: &'a Bound<T>, right: &'a Bound<T>) -> &'a Bound<T> {
        if Self::compare_upper(left, right) == Ordering::Greater {
            right
        } else {
            left
        }
    }
}
