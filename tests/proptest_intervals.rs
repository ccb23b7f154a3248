//! Property-based tests for the interval algebra.
//!
//! Endpoints are drawn from a small integer range so that equal, touching and overlapping
//! bounds occur often. Membership is checked pointwise over a range that covers every
//! generated endpoint plus some margin.

use proptest::prelude::*;

use x86scope::interval::{Bound, Interval, IntervalFormat, IntervalMap, IntervalSet};

const POINTS: std::ops::RangeInclusive<i32> = -14..=14;

fn bound() -> impl Strategy<Value = Bound<i32>> {
    prop_oneof![
        1 => Just(Bound::Unbounded),
        4 => (-10..10i32).prop_map(Bound::Inclusive),
        4 => (-10..10i32).prop_map(Bound::Exclusive),
    ]
}

fn interval() -> impl Strategy<Value = Interval<i32>> {
    (bound(), bound()).prop_map(|(lower, upper)| Interval::new(lower, upper))
}

fn intervals() -> impl Strategy<Value = Vec<Interval<i32>>> {
    prop::collection::vec(interval(), 0..8)
}

fn is_canonical(set: &IntervalSet<i32>) -> bool {
    set.iter().all(|i| !i.is_empty())
        && set
            .as_slice()
            .windows(2)
            .all(|pair| pair[0].is_before(&pair[1]) && !pair[0].is_touching(&pair[1]))
}

// =============================================================================
// Interval Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(5000))]

    /// Disjunct and overlapping are exact opposites, and both are symmetric.
    #[test]
    fn disjunct_is_not_overlapping(a in interval(), b in interval()) {
        prop_assert_eq!(a.is_disjunct(&b), !a.overlaps(&b));
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        prop_assert_eq!(a.overlaps(&b), a.intersection(&b).is_some());
    }

    /// Intersection contains exactly the common points.
    #[test]
    fn intersection_is_pointwise(a in interval(), b in interval()) {
        let common = a.intersection(&b);
        for point in POINTS {
            let expected = a.contains(&point) && b.contains(&point);
            prop_assert_eq!(common.as_ref().is_some_and(|i| i.contains(&point)), expected);
        }
    }

    /// Rendering then parsing yields an equal interval.
    #[test]
    fn display_round_trip(a in interval()) {
        let parsed: Interval<i32> = a.to_string().parse().unwrap();
        prop_assert_eq!(&parsed, &a);

        let format = IntervalFormat::new().with_infinity("oo");
        prop_assert_eq!(format.parse::<i32>(&format.format(&a)).unwrap(), a);
    }
}

// =============================================================================
// Set Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// A set contains exactly the points of the intervals added to it.
    #[test]
    fn set_membership_is_union(parts in intervals()) {
        let set: IntervalSet<i32> = parts.iter().cloned().collect();

        prop_assert!(is_canonical(&set));
        for point in POINTS {
            prop_assert_eq!(set.contains(&point), parts.iter().any(|i| i.contains(&point)));
        }
    }

    /// Adding reports a change exactly when the interval was not already covered.
    #[test]
    fn add_then_contains(parts in intervals(), extra in interval()) {
        let mut set: IntervalSet<i32> = parts.into_iter().collect();
        let covered = set.contains_interval(&extra);

        prop_assert_eq!(set.add(extra.clone()), !covered);
        prop_assert!(set.contains_interval(&extra));
        prop_assert!(!set.add(extra));
        prop_assert!(is_canonical(&set));
    }

    /// Removing clears exactly the removed points.
    #[test]
    fn remove_is_pointwise(parts in intervals(), removed in interval()) {
        let before: IntervalSet<i32> = parts.into_iter().collect();
        let mut after = before.clone();
        after.remove(&removed);

        prop_assert!(is_canonical(&after));
        for point in POINTS {
            prop_assert_eq!(
                after.contains(&point),
                before.contains(&point) && !removed.contains(&point)
            );
        }
    }

    /// Complementing twice restores the set, once inverts membership.
    #[test]
    fn complement_is_involution(parts in intervals()) {
        let original: IntervalSet<i32> = parts.into_iter().collect();
        let mut set = original.clone();

        set.complement();
        prop_assert!(is_canonical(&set));
        for point in POINTS {
            prop_assert_eq!(set.contains(&point), !original.contains(&point));
        }

        set.complement();
        prop_assert_eq!(set, original);
    }

    /// Set operations agree with pointwise boolean logic.
    #[test]
    fn set_operations_are_pointwise(left in intervals(), right in intervals()) {
        let a: IntervalSet<i32> = left.into_iter().collect();
        let b: IntervalSet<i32> = right.into_iter().collect();

        let mut union = a.clone();
        union.union_with(&b);
        let mut difference = a.clone();
        difference.difference_with(&b);
        let mut intersection = a.clone();
        intersection.intersect_with(&b);

        for set in [&union, &difference, &intersection] {
            prop_assert!(is_canonical(set));
        }
        for point in POINTS {
            let (x, y) = (a.contains(&point), b.contains(&point));
            prop_assert_eq!(union.contains(&point), x || y);
            prop_assert_eq!(difference.contains(&point), x && !y);
            prop_assert_eq!(intersection.contains(&point), x && y);
        }
    }

    /// Rendering then parsing yields an equal set.
    #[test]
    fn set_display_round_trip(parts in intervals()) {
        let set: IntervalSet<i32> = parts.into_iter().collect();
        let parsed: IntervalSet<i32> = set.to_string().parse().unwrap();
        prop_assert_eq!(parsed, set);
    }
}

// =============================================================================
// Map Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Every point maps to the combination of the values added over it.
    #[test]
    fn map_combines_pointwise(additions in prop::collection::vec((interval(), 0u32..4), 0..6)) {
        let mut map: IntervalMap<i32, u32> = IntervalMap::new();
        for (keys, bit) in &additions {
            map.add(keys.clone(), 1 << bit, |old, new| old | new);
        }

        let keys: Vec<&Interval<i32>> = map.iter().map(|(k, _)| k).collect();
        prop_assert!(keys.iter().all(|k| !k.is_empty()));
        prop_assert!(keys.windows(2).all(|pair| pair[0].is_before(pair[1])));

        for point in POINTS {
            let expected = additions
                .iter()
                .filter(|(keys, _)| keys.contains(&point))
                .fold(None, |acc: Option<u32>, (_, bit)| Some(acc.unwrap_or(0) | 1 << bit));
            prop_assert_eq!(map.get(&point).copied(), expected);
        }
    }

    /// Removing keys clears exactly those points and keeps the rest.
    #[test]
    fn map_remove_is_pointwise(
        additions in prop::collection::vec((interval(), 0u32..100), 0..6),
        removed in interval(),
    ) {
        let mut map: IntervalMap<i32, u32> = IntervalMap::new();
        for (keys, value) in &additions {
            map.insert(keys.clone(), *value);
        }
        let before = map.clone();
        map.remove(&removed);

        for point in POINTS {
            let expected = if removed.contains(&point) {
                None
            } else {
                before.get(&point)
            };
            prop_assert_eq!(map.get(&point), expected);
        }
    }
}
