//! Generic interval algebra.
//!
//! Intervals over any [`Ord`] value type, with inclusive, exclusive and unbounded
//! endpoints, plus two containers built on them:
//!
//! - [`IntervalSet`] - a union of maximal disjoint intervals; adding merges overlapping and
//!   touching intervals, removing trims and splits them
//! - [`IntervalMap`] - disjoint interval keys carrying values; overlapping insertions
//!   combine values through a caller-supplied function
//!
//! All endpoint orderings live in [`IntervalComparer`]. Text rendering and parsing are
//! configured by [`IntervalFormat`]; the `Display` / `FromStr` implementations use its
//! default.
//!
//! # Examples
//!
//! ```rust
//! use x86scope::interval::{Interval, IntervalSet};
//!
//! let mut set = IntervalSet::new();
//! set.add(Interval::from(0..10));
//! set.add(Interval::from(20..=30));
//!
//! let mut gaps = set.clone();
//! gaps.complement();
//! assert_eq!(gaps.to_string(), "(-∞;0) U [10;20) U (30;+∞)");
//!
//! gaps.complement();
//! assert_eq!(gaps, set);
//! ```

mod bound;
mod comparer;
mod format;
mod interval;
mod map;
mod set;

pub use bound::Bound;
pub use comparer::IntervalComparer;
pub use format::{IntervalFormat, EMPTY_SET, INFINITY_SPELLINGS, UNION_SEPARATOR};
pub use interval::Interval;
pub use map::IntervalMap;
pub use set::IntervalSet;
