//! Text rendering and parsing of intervals, sets and maps.
//!
//! An interval is written `(lower;upper)`, where `(` / `[` mark an exclusive / inclusive
//! lower bound and `)` / `]` an exclusive / inclusive upper bound. Unbounded sides are
//! written as a signed infinity token: `(-∞;5]`, `[0;+∞)`. Sets join their intervals with
//! `" U "` and render as `{}` when empty; maps additionally append `=>value` to every key.
//!
//! The parser accepts the spellings `∞`, `oo`, `infinity`, `infty` and the empty string for
//! infinity (case-insensitive, with an optional `+` or `-` sign) in addition to the
//! configured one, and trims whitespace around every component.

use std::{fmt, str::FromStr};

use crate::{
    interval::{Bound, Interval, IntervalSet},
    Result,
};

/// Infinity spellings accepted by [`IntervalFormat::parse`] besides the configured one.
pub const INFINITY_SPELLINGS: [&str; 5] = ["∞", "oo", "infinity", "infty", ""];

/// Separator between the intervals of a set.
pub const UNION_SEPARATOR: &str = " U ";

/// Rendering of the empty set.
pub const EMPTY_SET: &str = "{}";

/// Text format configuration for intervals.
///
/// # Examples
///
/// ```rust
/// use x86scope::interval::{Interval, IntervalFormat};
///
/// let format = IntervalFormat::new().with_infinity("oo");
/// let interval: Interval<i64> = format.parse("( -infinity ; 5 ]")?;
///
/// assert_eq!(format.format(&interval), "(-oo;5]");
/// assert_eq!(interval.to_string(), "(-∞;5]");
/// # Ok::<(), x86scope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalFormat {
    /// Token written for an unbounded side, prefixed by `-` or `+` (default: `∞`)
    pub infinity: String,
}

impl Default for IntervalFormat {
    fn default() -> Self {
        IntervalFormat {
            infinity: "∞".to_string(),
        }
    }
}

impl IntervalFormat {
    /// Creates the default format.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the infinity token used for rendering. It is accepted by the parser as well.
    #[must_use]
    pub fn with_infinity(mut self, infinity: impl Into<String>) -> Self {
        self.infinity = infinity.into();
        self
    }

    /// Renders an interval.
    pub fn format<T: Ord + fmt::Display>(&self, interval: &Interval<T>) -> String {
        Rendered {
            format: self,
            lower: interval.lower(),
            upper: interval.upper(),
        }
        .to_string()
    }

    /// Renders a set as its intervals joined by `" U "`, or `{}` when empty.
    pub fn format_set<T: Ord + Clone + fmt::Display>(&self, set: &IntervalSet<T>) -> String {
        if set.is_empty() {
            return EMPTY_SET.to_string();
        }

        set.iter()
            .map(|interval| self.format(interval))
            .collect::<Vec<_>>()
            .join(UNION_SEPARATOR)
    }

    /// Parses an interval.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedInterval`] if the brackets or the `;` separator are
    /// missing, or if a bound is neither an infinity token nor a parseable value.
    pub fn parse<T: Ord + FromStr>(&self, text: &str) -> Result<Interval<T>> {
        let trimmed = text.trim();

        let lower_inclusive = match trimmed.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(malformed_interval!(text, "expected '[' or '(' at the start")),
        };
        let upper_inclusive = match trimmed.chars().last() {
            Some(']') if trimmed.len() > 1 => true,
            Some(')') if trimmed.len() > 1 => false,
            _ => return Err(malformed_interval!(text, "expected ']' or ')' at the end")),
        };

        let inner = &trimmed[1..trimmed.len() - 1];
        let Some((lower, upper)) = inner.split_once(';') else {
            return Err(malformed_interval!(text, "missing ';' between the bounds"));
        };

        Ok(Interval::new(
            self.parse_bound(text, lower, lower_inclusive)?,
            self.parse_bound(text, upper, upper_inclusive)?,
        ))
    }

    /// Parses a set written as intervals joined by `" U "`. `{}` and the empty string parse
    /// to the empty set; overlapping or touching intervals are merged.
    ///
    /// A `U` only separates intervals when it sits between a closing and an opening bracket,
    /// so infinity tokens containing `U` still parse.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedInterval`] if any of the intervals is malformed.
    pub fn parse_set<T: Ord + Clone + FromStr>(&self, text: &str) -> Result<IntervalSet<T>> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == EMPTY_SET {
            return Ok(IntervalSet::new());
        }

        split_union(trimmed)
            .into_iter()
            .map(|part| self.parse(part))
            .collect()
    }

    /// Returns true if `token` spells infinity, ignoring case and one leading sign.
    pub fn is_infinity(&self, token: &str) -> bool {
        let token = token.trim();
        let unsigned = token
            .strip_prefix(['+', '-'])
            .unwrap_or(token)
            .trim_start();

        unsigned.eq_ignore_ascii_case(&self.infinity)
            || INFINITY_SPELLINGS
                .iter()
                .any(|spelling| unsigned.eq_ignore_ascii_case(spelling))
    }

    fn parse_bound<T: FromStr>(&self, text: &str, token: &str, inclusive: bool) -> Result<Bound<T>> {
        if self.is_infinity(token) {
            return Ok(Bound::Unbounded);
        }

        let token = token.trim();
        match token.parse::<T>() {
            Ok(value) if inclusive => Ok(Bound::Inclusive(value)),
            Ok(value) => Ok(Bound::Exclusive(value)),
            Err(_) => Err(malformed_interval!(text, "cannot parse bound '{}'", token)),
        }
    }

    pub(crate) fn write<T: fmt::Display>(
        &self,
        f: &mut fmt::Formatter<'_>,
        lower: &Bound<T>,
        upper: &Bound<T>,
    ) -> fmt::Result {
        match lower {
            Bound::Unbounded => write!(f, "(-{}", self.infinity)?,
            Bound::Inclusive(value) => write!(f, "[{}", value)?,
            Bound::Exclusive(value) => write!(f, "({}", value)?,
        }
        f.write_str(";")?;
        match upper {
            Bound::Unbounded => write!(f, "+{})", self.infinity),
            Bound::Inclusive(value) => write!(f, "{}]", value),
            Bound::Exclusive(value) => write!(f, "{})", value),
        }
    }
}

/// Splits set text at every `U` found between a closing and an opening bracket.
fn split_union(text: &str) -> Vec<&str> {
    let separator = UNION_SEPARATOR.trim();
    let mut parts = Vec::new();
    let mut start = 0;

    for (index, _) in text.match_indices(separator) {
        let before = text[start..index].trim_end();
        let after = text[index + separator.len()..].trim_start();
        if before.ends_with([']', ')']) && after.starts_with(['[', '(']) {
            parts.push(&text[start..index]);
            start = index + separator.len();
        }
    }

    parts.push(&text[start..]);
    parts
}

struct Rendered<'a, T> {
    format: &'a IntervalFormat,
    lower: &'a Bound<T>,
    upper: &'a Bound<T>,
}

impl<T: fmt::Display> fmt::Display for Rendered<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format.write(f, self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn parse(text: &str) -> Result<Interval<i32>> {
        IntervalFormat::default().parse(text)
    }

    #[test]
    fn renders_all_bound_kinds() {
        let format = IntervalFormat::default();
        assert_eq!(format.format(&Interval::new(Bound::Inclusive(1), Bound::Exclusive(2))), "[1;2)");
        assert_eq!(format.format(&Interval::new(Bound::Exclusive(-1), Bound::Inclusive(2))), "(-1;2]");
        assert_eq!(format.format(&Interval::<i32>::full()), "(-∞;+∞)");
        assert_eq!(
            IntervalFormat::new().with_infinity("oo").format(&Interval::<i32>::full()),
            "(-oo;+oo)"
        );
    }

    #[test]
    fn accepts_every_infinity_spelling() {
        for text in [
            "(-∞;5]",
            "(-oo;5]",
            "(-infinity;5]",
            "(-INFTY;5]",
            "(;5]",
            "(-;5]",
            "( - oo ; 5 ]",
            "[∞;5]",
        ] {
            assert_eq!(
                parse(text).unwrap(),
                Interval::new(Bound::Unbounded, Bound::Inclusive(5)),
                "{}",
                text
            );
        }

        assert_eq!(
            parse("[-3;+oo)").unwrap(),
            Interval::new(Bound::Inclusive(-3), Bound::Unbounded)
        );

        let custom = IntervalFormat::new().with_infinity("inf");
        assert!(custom.is_infinity("-INF"));
        assert!(!IntervalFormat::default().is_infinity("inf"));
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["", "1;2]", "[1;2", "[1,2]", "[a;2]", "[1;2;3]", "["] {
            assert!(
                matches!(parse(text), Err(Error::MalformedInterval { .. })),
                "{}",
                text
            );
        }
    }

    #[test]
    fn sets() {
        let format = IntervalFormat::new().with_infinity("oo");
        let set: IntervalSet<i32> = format.parse_set("(-oo;5] U (7;9) U [12;16]").unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(format.format_set(&set), "(-oo;5] U (7;9) U [12;16]");
        assert_eq!(format.format_set(&IntervalSet::<i32>::new()), "{}");
        assert!(format.parse_set::<i32>("{}").unwrap().is_empty());
        assert!(format.parse_set::<i32>("[1;2] U nope").is_err());
        assert_eq!(format.parse_set::<i32>("[1;2]U[4;5]").unwrap().len(), 2);
    }

    #[test]
    fn sets_with_infinity_containing_separator() {
        let format = IntervalFormat::new().with_infinity("UNBOUNDED");
        let set: IntervalSet<i32> = "(-∞;0) U [3;4] U (7;+∞)".parse().unwrap();

        let text = format.format_set(&set);
        assert_eq!(text, "(-UNBOUNDED;0) U [3;4] U (7;+UNBOUNDED)");
        assert_eq!(format.parse_set::<i32>(&text).unwrap(), set);

        let full = format.format_set(&IntervalSet::<i32>::from(Interval::full()));
        assert_eq!(format.parse_set::<i32>(&full).unwrap().len(), 1);
    }
}
