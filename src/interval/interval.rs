//! The [`Interval`] type.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use crate::{
    interval::{Bound, IntervalComparer, IntervalFormat},
    Error, Result,
};

/// A contiguous range of an ordered value type, delimited by a lower and an upper [`Bound`].
///
/// Intervals may be empty: emptiness is a property of the bounds (see
/// [`Interval::is_empty`]), not a separate state. All empty intervals compare equal and hash
/// alike, whatever their bounds.
///
/// # Examples
///
/// ```rust
/// use x86scope::interval::{Bound, Interval};
///
/// let low: Interval<i32> = "[0;10)".parse()?;
/// let high = Interval::new(Bound::Inclusive(5), Bound::Unbounded);
///
/// assert!(low.overlaps(&high));
/// assert_eq!(low.intersection(&high), Some("[5;10)".parse()?));
/// assert!(!low.contains(&10));
/// # Ok::<(), x86scope::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Interval<T> {
    lower: Bound<T>,
    upper: Bound<T>,
}

impl<T: Ord> Interval<T> {
    /// Creates an interval from its bounds. Bounds that describe no value yield an empty
    /// interval.
    pub fn new(lower: Bound<T>, upper: Bound<T>) -> Self {
        Interval { lower, upper }
    }

    /// Creates an interval, rejecting bounds that describe no value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInterval`] if the interval would be empty.
    pub fn try_new(lower: Bound<T>, upper: Bound<T>) -> Result<Self>
    where
        T: fmt::Debug,
    {
        if IntervalComparer::lower_after_upper(&lower, &upper) {
            return Err(Error::InvalidInterval {
                message: format!("lower bound {:?} lies after upper bound {:?}", lower, upper),
            });
        }

        Ok(Interval { lower, upper })
    }

    /// `[value; value]`
    pub fn singleton(value: T) -> Self
    where
        T: Clone,
    {
        Interval {
            lower: Bound::Inclusive(value.clone()),
            upper: Bound::Inclusive(value),
        }
    }

    /// `(-∞; +∞)`
    pub fn full() -> Self {
        Interval {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// Returns the lower bound.
    pub fn lower(&self) -> &Bound<T> {
        &self.lower
    }

    /// Returns the upper bound.
    pub fn upper(&self) -> &Bound<T> {
        &self.upper
    }

    /// Splits the interval into its bounds.
    pub fn into_bounds(self) -> (Bound<T>, Bound<T>) {
        (self.lower, self.upper)
    }

    /// Returns true if no value satisfies both bounds.
    ///
    /// With both sides bounded, `[a;b]` is empty when `a > b`; any other combination is
    /// empty when `a >= b`. An unbounded side never makes an interval empty.
    pub fn is_empty(&self) -> bool {
        IntervalComparer::lower_after_upper(&self.lower, &self.upper)
    }

    /// Returns true if both bounds are unbounded.
    pub fn is_full(&self) -> bool {
        self.lower.is_unbounded() && self.upper.is_unbounded()
    }

    /// Returns true if `value` lies within the interval.
    pub fn contains(&self, value: &T) -> bool {
        let above_lower = match &self.lower {
            Bound::Unbounded => true,
            Bound::Inclusive(lower) => lower <= value,
            Bound::Exclusive(lower) => lower < value,
        };
        let below_upper = match &self.upper {
            Bound::Unbounded => true,
            Bound::Inclusive(upper) => value <= upper,
            Bound::Exclusive(upper) => value < upper,
        };

        above_lower && below_upper
    }

    /// Returns true if every value of `other` lies within this interval. The empty interval
    /// is contained by every interval.
    pub fn contains_interval(&self, other: &Interval<T>) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }

        IntervalComparer::compare_lower(&self.lower, &other.lower).is_le()
            && IntervalComparer::compare_upper(&self.upper, &other.upper).is_ge()
    }

    /// Returns true if the two intervals share at least one value.
    pub fn overlaps(&self, other: &Interval<T>) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        let lower = IntervalComparer::max_lower(&self.lower, &other.lower);
        let upper = IntervalComparer::min_upper(&self.upper, &other.upper);
        !IntervalComparer::lower_after_upper(lower, upper)
    }

    /// Returns true if the two intervals share no value.
    pub fn is_disjunct(&self, other: &Interval<T>) -> bool {
        !self.overlaps(other)
    }

    /// Returns true if every value of this interval lies below every value of `other`.
    /// Empty intervals have no position and are never before anything.
    pub fn is_before(&self, other: &Interval<T>) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && IntervalComparer::lower_after_upper(&other.lower, &self.upper)
    }

    /// Returns true if the intervals are adjacent with no gap and no shared value, in
    /// either order, e.g. `[1;5]` and `(5;9)`.
    pub fn is_touching(&self, other: &Interval<T>) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && (IntervalComparer::touching(&self.upper, &other.lower)
                || IntervalComparer::touching(&other.upper, &self.lower))
    }

    /// Returns true if every value of the interval lies below `value`.
    pub fn ends_before(&self, value: &T) -> bool {
        match &self.upper {
            Bound::Unbounded => false,
            Bound::Inclusive(upper) => upper < value,
            Bound::Exclusive(upper) => upper <= value,
        }
    }
}

impl<T: Ord + Clone> Interval<T> {
    /// Returns the values shared by both intervals, or `None` if they are disjunct.
    pub fn intersection(&self, other: &Interval<T>) -> Option<Interval<T>> {
        if !self.overlaps(other) {
            return None;
        }

        Some(Interval {
            lower: IntervalComparer::max_lower(&self.lower, &other.lower).clone(),
            upper: IntervalComparer::min_upper(&self.upper, &other.upper).clone(),
        })
    }

    /// Returns the smallest interval covering both intervals, including any gap between
    /// them. An empty operand contributes nothing.
    pub fn span(&self, other: &Interval<T>) -> Interval<T> {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }

        Interval {
            lower: IntervalComparer::min_lower(&self.lower, &other.lower).clone(),
            upper: IntervalComparer::max_upper(&self.upper, &other.upper).clone(),
        }
    }

    /// Returns the part of `[lower; +∞)` that lies strictly before the lower bound `next`,
    /// or `None` if that part is empty.
    pub(crate) fn until(lower: Bound<T>, next: &Bound<T>) -> Option<Interval<T>> {
        let interval = Interval::new(lower, next.complement()?);
        (!interval.is_empty()).then_some(interval)
    }

    /// Returns the part of `(-∞; upper]` that lies strictly after the upper bound `previous`,
    /// or `None` if that part is empty.
    pub(crate) fn after(previous: &Bound<T>, upper: Bound<T>) -> Option<Interval<T>> {
        let interval = Interval::new(previous.complement()?, upper);
        (!interval.is_empty()).then_some(interval)
    }
}

impl<T: Ord> PartialEq for Interval<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => true,
            (false, false) => self.lower == other.lower && self.upper == other.upper,
            _ => false,
        }
    }
}

impl<T: Ord> Eq for Interval<T> {}

impl<T: Ord + Hash> Hash for Interval<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.is_empty() {
            0_u8.hash(state);
        } else {
            1_u8.hash(state);
            self.lower.hash(state);
            self.upper.hash(state);
        }
    }
}

impl<T: Ord> From<std::ops::Range<T>> for Interval<T> {
    fn from(range: std::ops::Range<T>) -> Self {
        Interval::new(Bound::Inclusive(range.start), Bound::Exclusive(range.end))
    }
}

impl<T: Ord> From<std::ops::RangeInclusive<T>> for Interval<T> {
    fn from(range: std::ops::RangeInclusive<T>) -> Self {
        let (start, end) = range.into_inner();
        Interval::new(Bound::Inclusive(start), Bound::Inclusive(end))
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        IntervalFormat::default().write(f, &self.lower, &self.upper)
    }
}

impl<T: Ord + FromStr> FromStr for Interval<T> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        IntervalFormat::default().parse(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use Bound::{Exclusive, Inclusive, Unbounded};

    fn interval(text: &str) -> Interval<i32> {
        text.parse().unwrap()
    }

    #[test]
    fn emptiness() {
        assert!(!interval("[5;5]").is_empty());
        assert!(interval("[5;5)").is_empty());
        assert!(interval("(5;5]").is_empty());
        assert!(interval("(5;5)").is_empty());
        assert!(interval("[6;5]").is_empty());
        assert!(!interval("(-oo;5)").is_empty());
        assert!(!Interval::<i32>::full().is_empty());
        assert!(Interval::<i32>::full().is_full());
    }

    #[test]
    fn strict_construction() {
        assert!(Interval::try_new(Inclusive(1), Exclusive(2)).is_ok());
        assert!(matches!(
            Interval::try_new(Exclusive(2), Inclusive(2)),
            Err(Error::InvalidInterval { .. })
        ));
    }

    #[test]
    fn empty_intervals_are_equal() {
        assert_eq!(interval("(3;3)"), interval("[9;1]"));
        assert_ne!(interval("[3;3]"), interval("(3;3)"));

        let mut seen = HashSet::new();
        seen.insert(interval("(3;3)"));
        seen.insert(interval("[9;1]"));
        seen.insert(interval("[1;2]"));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn membership() {
        let closed_open = interval("[0;10)");
        assert!(closed_open.contains(&0));
        assert!(closed_open.contains(&9));
        assert!(!closed_open.contains(&10));
        assert!(!closed_open.contains(&-1));
        assert!(Interval::full().contains(&i32::MIN));
        assert!(Interval::singleton(4).contains(&4));

        assert!(closed_open.contains_interval(&interval("(0;5]")));
        assert!(!closed_open.contains_interval(&interval("[0;10]")));
        assert!(closed_open.contains_interval(&interval("(7;7)")));
        assert!(!interval("(7;7)").contains_interval(&interval("[1;1]")));
    }

    #[test]
    fn overlap_and_order() {
        let left = interval("[0;5]");
        let right = interval("(5;9)");

        assert!(!left.overlaps(&right));
        assert!(left.is_disjunct(&right));
        assert!(left.is_before(&right));
        assert!(!right.is_before(&left));
        assert!(left.is_touching(&right));
        assert!(right.is_touching(&left));

        let gap = interval("[6;9)");
        assert!(left.is_before(&gap));
        assert!(!left.is_touching(&gap));

        assert!(interval("[0;5]").overlaps(&interval("[5;6]")));
        assert!(!interval("[0;5)").overlaps(&interval("[5;6]")));
        assert!(!interval("(1;1)").overlaps(&Interval::full()));
        assert!(!interval("(1;1)").is_before(&interval("[4;5]")));
    }

    #[test]
    fn intersection_and_span() {
        assert_eq!(
            interval("[0;10)").intersection(&interval("(5;20]")),
            Some(interval("(5;10)"))
        );
        assert_eq!(interval("[0;5)").intersection(&interval("[5;6]")), None);
        assert_eq!(
            interval("[0;1]").span(&interval("(4;6)")),
            interval("[0;6)")
        );
        assert_eq!(
            interval("(1;1)").span(&interval("(4;6)")),
            interval("(4;6)")
        );
        assert_eq!(
            Interval::new(Unbounded, Exclusive(3)).span(&interval("[1;8]")),
            interval("(-oo;8]")
        );
    }

    #[test]
    fn pieces_between_bounds() {
        assert_eq!(
            Interval::until(Inclusive(0), &Inclusive(5)),
            Some(interval("[0;5)"))
        );
        assert_eq!(Interval::until(Inclusive(5), &Inclusive(5)), None);
        assert_eq!(Interval::until(Inclusive(0), &Unbounded), None);
        assert_eq!(
            Interval::after(&Inclusive(5), Unbounded),
            Some(interval("(5;+oo)"))
        );
        assert_eq!(Interval::after(&Exclusive(5), Exclusive(5)), None);
    }

    #[test]
    fn from_ranges() {
        assert_eq!(Interval::from(1..4), interval("[1;4)"));
        assert_eq!(Interval::from(1..=4), interval("[1;4]"));
        assert!(interval("[0;10)").ends_before(&10));
        assert!(!interval("[0;10]").ends_before(&10));
    }
}
