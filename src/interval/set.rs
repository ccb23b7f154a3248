//! Unions of disjoint intervals.

use std::{fmt, ops::Range, str::FromStr};

use log::trace;

use crate::{
    interval::{Bound, Interval, IntervalComparer, IntervalFormat},
    Error, Result,
};

/// A union of intervals, kept as a sorted sequence of maximal disjoint intervals.
///
/// Stored intervals are never empty, never overlap and never touch: adding an interval
/// merges it with everything it overlaps or touches, so two stored neighbours always have a
/// gap between them. Because the representation is canonical, two sets covering the same
/// values compare equal.
///
/// # Examples
///
/// ```rust
/// use x86scope::interval::{Interval, IntervalSet};
///
/// let mut set: IntervalSet<i32> = "(-oo;5] U (7;9) U [12;16]".parse()?;
///
/// assert!(set.add(Interval::singleton(6)));
/// assert_eq!(set.to_string(), "(-∞;5] U [6;6] U (7;9) U [12;16]");
///
/// assert!(set.add("(5;7]".parse()?));
/// assert_eq!(set.to_string(), "(-∞;9) U [12;16]");
/// # Ok::<(), x86scope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntervalSet<T: Ord> {
    intervals: Vec<Interval<T>>,
}

impl<T: Ord> Default for IntervalSet<T> {
    fn default() -> Self {
        IntervalSet {
            intervals: Vec::new(),
        }
    }
}

impl<T: Ord + Clone> IntervalSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the set covering every value.
    pub fn full() -> Self {
        IntervalSet {
            intervals: vec![Interval::full()],
        }
    }

    /// Returns the number of disjoint intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns true if the set covers no value.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Returns true if the set covers every value.
    pub fn is_full(&self) -> bool {
        matches!(self.intervals.as_slice(), [only] if only.is_full())
    }

    /// Iterates over the stored intervals in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Interval<T>> {
        self.intervals.iter()
    }

    /// Returns the stored intervals in ascending order.
    pub fn as_slice(&self) -> &[Interval<T>] {
        &self.intervals
    }

    /// Returns true if `value` is covered.
    pub fn contains(&self, value: &T) -> bool {
        let index = self
            .intervals
            .partition_point(|stored| stored.ends_before(value));
        self.intervals
            .get(index)
            .is_some_and(|stored| stored.contains(value))
    }

    /// Returns true if every value of `interval` is covered.
    pub fn contains_interval(&self, interval: &Interval<T>) -> bool {
        if interval.is_empty() {
            return true;
        }

        let index = self
            .intervals
            .partition_point(|stored| stored.is_before(interval));
        self.intervals
            .get(index)
            .is_some_and(|stored| stored.contains_interval(interval))
    }

    /// Adds the values of `interval` to the set.
    ///
    /// All stored intervals overlapping or touching `interval` are replaced by a single
    /// interval spanning them and `interval`.
    ///
    /// # Returns
    ///
    /// `true` if the set now covers values it did not cover before.
    pub fn add(&mut self, interval: Interval<T>) -> bool {
        if interval.is_empty() {
            return false;
        }

        let range = self.touching_range(&interval);
        if range.is_empty() {
            self.intervals.insert(range.start, interval);
            return true;
        }

        if range.len() == 1 && self.intervals[range.start].contains_interval(&interval) {
            return false;
        }

        if range.len() > 1 {
            trace!("interval merges {} stored intervals", range.len());
        }

        let first = &self.intervals[range.start];
        let last = &self.intervals[range.end - 1];
        let merged = Interval::new(
            IntervalComparer::min_lower(first.lower(), interval.lower()).clone(),
            IntervalComparer::max_upper(last.upper(), interval.upper()).clone(),
        );
        self.intervals.splice(range, [merged]);

        true
    }

    /// Removes the values of `interval` from the set, trimming or splitting the stored
    /// intervals it overlaps.
    ///
    /// # Returns
    ///
    /// `true` if the set covered any value of `interval`.
    pub fn remove(&mut self, interval: &Interval<T>) -> bool {
        let range = self.overlapping_range(interval);
        if range.is_empty() {
            return false;
        }

        let first = &self.intervals[range.start];
        let last = &self.intervals[range.end - 1];
        let left = Interval::until(first.lower().clone(), interval.lower());
        let right = Interval::after(interval.upper(), last.upper().clone());

        if range.len() > 1 {
            trace!("interval removes {} stored intervals", range.len());
        }
        self.intervals.splice(range, left.into_iter().chain(right));

        true
    }

    /// Replaces the set by the values it does not cover.
    ///
    /// For `N` stored intervals the complement holds the `N - 1` gaps between them plus
    /// one interval for each bounded outer end.
    pub fn complement(&mut self) {
        let (Some(first), Some(last)) = (self.intervals.first(), self.intervals.last()) else {
            self.intervals.push(Interval::full());
            return;
        };
        let starts_unbounded = first.lower().is_unbounded();
        let ends_bounded = !last.upper().is_unbounded();

        // Each slot becomes the gap before the interval it held.
        let mut gap_lower = Bound::Unbounded;
        for slot in &mut self.intervals {
            let (lower, upper) = std::mem::replace(slot, Interval::full()).into_bounds();
            *slot = Interval::new(gap_lower, flip(lower));
            gap_lower = flip(upper);
        }

        if ends_bounded {
            self.intervals.push(Interval::new(gap_lower, Bound::Unbounded));
        }
        if starts_unbounded {
            self.intervals.remove(0);
        }
    }

    /// Adds every value of `other`.
    pub fn union_with(&mut self, other: &IntervalSet<T>) {
        for interval in &other.intervals {
            self.add(interval.clone());
        }
    }

    /// Removes every value of `other`.
    pub fn difference_with(&mut self, other: &IntervalSet<T>) {
        for interval in &other.intervals {
            self.remove(interval);
        }
    }

    /// Keeps only the values also covered by `other`.
    pub fn intersect_with(&mut self, other: &IntervalSet<T>) {
        let mut result = IntervalSet::new();
        let (mut i, mut j) = (0, 0);

        while let (Some(left), Some(right)) = (self.intervals.get(i), other.intervals.get(j)) {
            if let Some(shared) = left.intersection(right) {
                result.add(shared);
            }

            if IntervalComparer::compare_upper(left.upper(), right.upper()).is_le() {
                i += 1;
            } else {
                j += 1;
            }
        }

        *self = result;
    }

    /// Stored intervals that overlap or touch `interval`.
    fn touching_range(&self, interval: &Interval<T>) -> Range<usize> {
        let start = self.intervals.partition_point(|stored| {
            stored.is_before(interval) && !stored.is_touching(interval)
        });
        let end = self.intervals.partition_point(|stored| {
            !(interval.is_before(stored) && !interval.is_touching(stored))
        });

        start..end.max(start)
    }

    /// Stored intervals that share at least one value with `interval`.
    fn overlapping_range(&self, interval: &Interval<T>) -> Range<usize> {
        if interval.is_empty() {
            return 0..0;
        }

        let start = self
            .intervals
            .partition_point(|stored| stored.is_before(interval));
        let end = self
            .intervals
            .partition_point(|stored| !interval.is_before(stored));

        start..end.max(start)
    }
}

impl<T: Ord + Clone> FromIterator<Interval<T>> for IntervalSet<T> {
    fn from_iter<I: IntoIterator<Item = Interval<T>>>(iter: I) -> Self {
        let mut set = IntervalSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord + Clone> Extend<Interval<T>> for IntervalSet<T> {
    fn extend<I: IntoIterator<Item = Interval<T>>>(&mut self, iter: I) {
        for interval in iter {
            self.add(interval);
        }
    }
}

impl<'a, T: Ord> IntoIterator for &'a IntervalSet<T> {
    type Item = &'a Interval<T>;
    type IntoIter = std::slice::Iter<'a, Interval<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl<T: Ord> IntoIterator for IntervalSet<T> {
    type Item = Interval<T>;
    type IntoIter = std::vec::IntoIter<Interval<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.into_iter()
    }
}

/// Moves a bound to the other side of its limit value: `[5` becomes `5)`.
fn flip<T>(bound: Bound<T>) -> Bound<T> {
    match bound {
        Bound::Unbounded => Bound::Unbounded,
        Bound::Inclusive(value) => Bound::Exclusive(value),
        Bound::Exclusive(value) => Bound::Inclusive(value),
    }
}

impl<T: Ord + Clone> From<Interval<T>> for IntervalSet<T> {
    fn from(interval: Interval<T>) -> Self {
        std::iter::once(interval).collect()
    }
}

impl<T: Ord + Clone + fmt::Display> fmt::Display for IntervalSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&IntervalFormat::default().format_set(self))
    }
}

impl<T: Ord + Clone + FromStr> FromStr for IntervalSet<T> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        IntervalFormat::default().parse_set(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(text: &str) -> IntervalSet<i32> {
        text.parse().unwrap()
    }

    fn interval(text: &str) -> Interval<i32> {
        text.parse().unwrap()
    }

    #[test]
    fn add_keeps_disjoint_intervals_apart() {
        let mut s = set("(-oo;5] U (7;9) U [12;16]");
        assert!(s.add(interval("[6;6]")));
        assert_eq!(s, set("(-oo;5] U [6;6] U (7;9) U [12;16]"));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn add_merges_touching_intervals() {
        let mut s = set("(-oo;5] U (7;9) U [12;16]");
        assert!(s.add(interval("(5;7]")));
        assert_eq!(s, set("(-oo;9) U [12;16]"));
        assert_eq!(
            IntervalFormat::new().with_infinity("oo").format_set(&s),
            "(-oo;9) U [12;16]"
        );
    }

    #[test]
    fn add_reports_growth() {
        let mut s = set("[0;10]");
        assert!(!s.add(interval("[2;3)")));
        assert!(!s.add(interval("(4;4)")));
        assert!(s.add(interval("[10;11]")));
        assert_eq!(s, set("[0;11]"));

        let mut s = set("[0;1) U (1;2]");
        assert!(s.add(Interval::singleton(1)));
        assert_eq!(s, set("[0;2]"));
    }

    #[test]
    fn parsing_normalizes() {
        let s = set("[5;6] U [0;3] U (2;5)");
        assert_eq!(s.len(), 1);
        assert_eq!(s.to_string(), "[0;6]");
        assert_eq!(set("{}"), IntervalSet::new());
        assert_eq!(IntervalSet::<i32>::new().to_string(), "{}");
    }

    #[test]
    fn remove_without_shared_values() {
        let mut s = set("(-oo;5] U (7;9) U [12;16]");
        assert!(!s.remove(&interval("(5;7]")));
        assert_eq!(s, set("(-oo;5] U (7;9) U [12;16]"));
    }

    #[test]
    fn remove_trims_and_splits() {
        let mut s = set("(-oo;5] U (7;9) U [12;16]");
        assert!(s.remove(&interval("[3;8]")));
        assert_eq!(s, set("(-oo;3) U (8;9) U [12;16]"));

        assert!(s.remove(&interval("[13;14)")));
        assert_eq!(s, set("(-oo;3) U (8;9) U [12;13) U [14;16]"));

        assert!(s.remove(&Interval::full()));
        assert!(s.is_empty());
    }

    #[test]
    fn membership() {
        let s = set("(-oo;5] U (7;9) U [12;16]");
        assert!(s.contains(&-100));
        assert!(s.contains(&5));
        assert!(!s.contains(&6));
        assert!(!s.contains(&7));
        assert!(s.contains(&8));
        assert!(!s.contains(&9));
        assert!(s.contains(&16));
        assert!(!s.contains(&17));

        assert!(s.contains_interval(&interval("[13;14]")));
        assert!(!s.contains_interval(&interval("[4;8]")));
        assert!(s.contains_interval(&interval("(1;1)")));
    }

    #[test]
    fn complement_counts() {
        let mut s = set("(-oo;5] U (7;9) U [12;16]");
        s.complement();
        assert_eq!(s, set("(5;7] U [9;12) U (16;+oo)"));
        s.complement();
        assert_eq!(s, set("(-oo;5] U (7;9) U [12;16]"));

        let mut bounded = set("[0;1] U [3;4]");
        bounded.complement();
        assert_eq!(bounded.len(), 3);

        let mut open = set("(-oo;1] U [3;+oo)");
        open.complement();
        assert_eq!(open, set("(1;3)"));

        let mut full = IntervalSet::<i32>::full();
        full.complement();
        assert!(full.is_empty());

        let mut left_open = set("(-oo;0) U [2;3]");
        left_open.complement();
        assert_eq!(left_open, set("[0;2) U (3;+oo)"));

        let mut right_open = set("[0;1] U (4;+oo)");
        right_open.complement();
        assert_eq!(right_open, set("(-oo;0) U (1;4]"));

        let mut empty = IntervalSet::<i32>::new();
        empty.complement();
        assert!(empty.is_full());
        empty.complement();
        assert!(empty.is_empty());
    }

    #[test]
    fn set_operations() {
        let mut s = set("[0;10]");
        s.union_with(&set("[20;30] U (10;12)"));
        assert_eq!(s, set("[0;12) U [20;30]"));

        s.difference_with(&set("[5;25]"));
        assert_eq!(s, set("[0;5) U (25;30]"));

        s.intersect_with(&set("[3;27] U [29;+oo)"));
        assert_eq!(s, set("[3;5) U (25;27] U [29;30]"));

        s.intersect_with(&IntervalSet::new());
        assert!(s.is_empty());
    }

    #[test]
    fn collecting() {
        let s: IntervalSet<i32> = vec![interval("[4;5]"), interval("[0;1]"), interval("(1;2)")]
            .into_iter()
            .collect();
        assert_eq!(s.as_slice(), &[interval("[0;2)"), interval("[4;5]")]);
        assert_eq!(IntervalSet::from(interval("[1;1)")), IntervalSet::new());
    }
}
