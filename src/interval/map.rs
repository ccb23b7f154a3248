//! Interval-keyed maps with combine-on-overlap insertion.

use std::{fmt, ops::Range};

use log::trace;

use crate::interval::{
    format::{EMPTY_SET, UNION_SEPARATOR},
    Interval, IntervalFormat, IntervalSet,
};

/// A map from disjoint intervals to values.
///
/// Keys are sorted and pairwise disjoint. Unlike [`IntervalSet`], touching keys are never
/// merged, even when their values are equal: each stored entry keeps the value it was
/// given.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeSet;
/// use x86scope::interval::IntervalMap;
///
/// let union = |old: &BTreeSet<u8>, new: &BTreeSet<u8>| -> BTreeSet<u8> {
///     old.union(new).copied().collect()
/// };
///
/// let mut map: IntervalMap<i32, BTreeSet<u8>> = IntervalMap::new();
/// map.add("[5;7)".parse()?, BTreeSet::from([1]), union);
/// map.add("[5;11)".parse()?, BTreeSet::from([2]), union);
///
/// assert_eq!(map.get(&6), Some(&BTreeSet::from([1, 2])));
/// assert_eq!(map.get(&10), Some(&BTreeSet::from([2])));
/// assert_eq!(map.get(&11), None);
/// # Ok::<(), x86scope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalMap<K: Ord, V> {
    entries: Vec<(Interval<K>, V)>,
}

impl<K: Ord, V> Default for IntervalMap<K, V> {
    fn default() -> Self {
        IntervalMap {
            entries: Vec::new(),
        }
    }
}

impl<K: Ord + Clone, V: Clone> IntervalMap<K, V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no key is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Interval<K>, &V)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Returns the value of the entry covering `point`.
    pub fn get(&self, point: &K) -> Option<&V> {
        let index = self
            .entries
            .partition_point(|(key, _)| key.ends_before(point));
        self.entries
            .get(index)
            .filter(|(key, _)| key.contains(point))
            .map(|(_, value)| value)
    }

    /// Returns the union of all keys.
    pub fn covered(&self) -> IntervalSet<K> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Maps the values of `keys` to `value`, combining with what is already stored.
    ///
    /// Afterwards the covered region is the old one plus `keys`. Points covered both
    /// before and by `keys` map to `combine(old, value)`; points covered by only one side
    /// keep that side's value. Stored entries that `keys` cuts through are split at the
    /// bounds of `keys`, and the gaps between stored entries inside `keys` are filled with
    /// `value`.
    ///
    /// # Arguments
    ///
    /// * `keys` - The interval to map; an empty interval leaves the map unchanged
    /// * `value` - The value to store
    /// * `combine` - Merges an existing value with `value` as `combine(existing, value)`
    pub fn add<F>(&mut self, keys: Interval<K>, value: V, mut combine: F)
    where
        F: FnMut(&V, &V) -> V,
    {
        if keys.is_empty() {
            return;
        }

        let range = self.overlapping_range(&keys);
        if range.is_empty() {
            self.entries.insert(range.start, (keys, value));
            return;
        }

        if range.len() > 1 {
            trace!("key spans {} stored entries", range.len());
        }

        let mut pieces = Vec::with_capacity(2 * range.len() + 2);
        // Start of the part of `keys` not yet accounted for; `None` once an entry
        // extends to +∞.
        let mut uncovered = Some(keys.lower().clone());

        for (key, existing) in self.entries.drain(range.clone()) {
            let combined = combine(&existing, &value);

            if let Some(outside) = Interval::until(key.lower().clone(), keys.lower()) {
                pieces.push((outside, existing.clone()));
            }
            if let Some(gap) = uncovered.and_then(|lower| Interval::until(lower, key.lower())) {
                pieces.push((gap, value.clone()));
            }
            if let Some(core) = key.intersection(&keys) {
                pieces.push((core, combined));
            }
            if let Some(outside) = Interval::after(keys.upper(), key.upper().clone()) {
                pieces.push((outside, existing));
            }

            uncovered = key.upper().complement();
        }

        if let Some(lower) = uncovered {
            let tail = Interval::new(lower, keys.upper().clone());
            if !tail.is_empty() {
                pieces.push((tail, value));
            }
        }

        self.entries.splice(range.start..range.start, pieces);
    }

    /// Maps the values of `keys` to `value`, replacing whatever they mapped to.
    pub fn insert(&mut self, keys: Interval<K>, value: V) {
        self.add(keys, value, |_, new| new.clone());
    }

    /// Unmaps the values of `keys`, trimming or splitting the entries it overlaps.
    ///
    /// # Returns
    ///
    /// `true` if any stored key shared a value with `keys`.
    pub fn remove(&mut self, keys: &Interval<K>) -> bool {
        let range = self.overlapping_range(keys);
        if range.is_empty() {
            return false;
        }

        let mut pieces = Vec::with_capacity(2);
        for (key, existing) in self.entries.drain(range.clone()) {
            if let Some(outside) = Interval::until(key.lower().clone(), keys.lower()) {
                pieces.push((outside, existing.clone()));
            }
            if let Some(outside) = Interval::after(keys.upper(), key.upper().clone()) {
                pieces.push((outside, existing));
            }
        }

        self.entries.splice(range.start..range.start, pieces);
        true
    }

    /// Stored entries whose keys share at least one value with `keys`.
    fn overlapping_range(&self, keys: &Interval<K>) -> Range<usize> {
        if keys.is_empty() {
            return 0..0;
        }

        let start = self
            .entries
            .partition_point(|(key, _)| key.is_before(keys));
        let end = self
            .entries
            .partition_point(|(key, _)| !keys.is_before(key));

        start..end.max(start)
    }
}

impl<K: Ord + fmt::Display, V: fmt::Display> fmt::Display for IntervalMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str(EMPTY_SET);
        }

        let format = IntervalFormat::default();
        for (index, (key, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(UNION_SEPARATOR)?;
            }
            write!(f, "{}=>{}", format.format(key), value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn interval(text: &str) -> Interval<i32> {
        text.parse().unwrap()
    }

    fn union(old: &BTreeSet<u8>, new: &BTreeSet<u8>) -> BTreeSet<u8> {
        old.union(new).copied().collect()
    }

    fn sum(old: &i32, new: &i32) -> i32 {
        old + new
    }

    fn entries<V: Clone>(map: &IntervalMap<i32, V>) -> Vec<(String, V)> {
        map.iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn overlapping_add_splits_and_combines() {
        let mut map = IntervalMap::new();
        map.add(interval("[5;7)"), BTreeSet::from([1]), union);
        map.add(interval("[5;11)"), BTreeSet::from([2]), union);

        assert_eq!(
            entries(&map),
            vec![
                ("[5;7)".to_string(), BTreeSet::from([1, 2])),
                ("[7;11)".to_string(), BTreeSet::from([2])),
            ]
        );
    }

    #[test]
    fn new_key_inside_existing_entry() {
        let mut map = IntervalMap::new();
        map.add(interval("[0;10]"), 1, sum);
        map.add(interval("(3;5]"), 10, sum);

        assert_eq!(map.to_string(), "[0;3]=>1 U (3;5]=>11 U (5;10]=>1");
    }

    #[test]
    fn gaps_between_entries_are_filled() {
        let mut map = IntervalMap::new();
        map.add(interval("[0;2)"), 1, sum);
        map.add(interval("[4;6)"), 2, sum);
        map.add(interval("(8;+oo)"), 3, sum);
        map.add(interval("[1;9]"), 100, sum);

        assert_eq!(
            map.to_string(),
            "[0;1)=>1 U [1;2)=>101 U [2;4)=>100 U [4;6)=>102 U [6;8]=>100 U (8;9]=>103 U (9;+∞)=>3"
        );
        assert_eq!(map.get(&5), Some(&102));
        assert_eq!(map.get(&8), Some(&100));
        assert_eq!(map.get(&1000), Some(&3));
        assert_eq!(map.get(&-1), None);
    }

    #[test]
    fn disjoint_add_and_touching_entries() {
        let mut map = IntervalMap::new();
        map.add(interval("[0;1]"), 'a', |_, new| *new);
        map.add(interval("(1;2]"), 'a', |_, new| *new);

        assert_eq!(map.len(), 2);
        assert_eq!(map.covered().to_string(), "[0;2]");
        map.add(interval("(3;3)"), 'b', |_, new| *new);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn insert_replaces() {
        let mut map = IntervalMap::new();
        map.insert(interval("[0;10)"), "low");
        map.insert(interval("[5;15)"), "high");

        assert_eq!(map.to_string(), "[0;5)=>low U [5;10)=>high U [10;15)=>high");
        assert_eq!(map.covered().len(), 1);
    }

    #[test]
    fn remove_trims_entries() {
        let mut map = IntervalMap::new();
        map.insert(interval("[0;10)"), 1);
        map.insert(interval("[20;30)"), 2);

        assert!(!map.remove(&interval("[10;20)")));
        assert!(map.remove(&interval("[5;25)")));
        assert_eq!(map.to_string(), "[0;5)=>1 U [25;30)=>2");

        assert!(map.remove(&interval("[1;2]")));
        assert_eq!(map.to_string(), "[0;1)=>1 U (2;5)=>1 U [25;30)=>2");

        assert!(map.remove(&Interval::full()));
        assert!(map.is_empty());
        assert_eq!(map.to_string(), "{}");
    }
}
