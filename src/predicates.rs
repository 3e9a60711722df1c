use crate::{ast::ComparisonOperator, values::Value};
use regex::Regex;
use std::{
    fmt::{Display, Formatter},
    ops::{Bound, RangeBounds},
};

/// A leaf-level test applied to a single attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Interval(Interval),
    IsNull,
    Pattern(Pattern),
}

impl Predicate {
    /// Evaluate the predicate against an attribute value (`None` when the attribute is null).
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Self::IsNull, value) => value.is_none(),
            (_, None) => false,
            (Self::Interval(interval), Some(value)) => interval.contains(value),
            (Self::Pattern(pattern), Some(value)) => value
                .as_str()
                .is_some_and(|value| pattern.is_match(value)),
        }
    }

    #[inline]
    pub const fn is_interval(&self) -> bool {
        matches!(self, Self::Interval(_))
    }
}

impl Display for Predicate {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Interval(interval) => write!(formatter, "in {interval}"),
            Self::IsNull => write!(formatter, "is null"),
            Self::Pattern(pattern) => write!(formatter, "~ /{pattern}/"),
        }
    }
}

/// A bounded or unbounded, open or closed range of values.
///
/// `Bound::Unbounded` stands for minus infinity on the lower side and for plus infinity on the
/// upper side.
#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    lower: Bound<Value>,
    upper: Bound<Value>,
}

impl Interval {
    pub const fn new(lower: Bound<Value>, upper: Bound<Value>) -> Self {
        Self { lower, upper }
    }

    /// The interval containing exactly the values for which `attribute <operator> value` holds.
    pub fn from_comparison(operator: ComparisonOperator, value: Value) -> Self {
        match operator {
            ComparisonOperator::Equal => {
                Self::new(Bound::Included(value.clone()), Bound::Included(value))
            }
            ComparisonOperator::Less => Self::new(Bound::Unbounded, Bound::Excluded(value)),
            ComparisonOperator::LessOrEqual => Self::new(Bound::Unbounded, Bound::Included(value)),
            ComparisonOperator::Greater => Self::new(Bound::Excluded(value), Bound::Unbounded),
            ComparisonOperator::GreaterOrEqual => {
                Self::new(Bound::Included(value), Bound::Unbounded)
            }
        }
    }

    #[inline]
    pub fn lower(&self) -> &Bound<Value> {
        &self.lower
    }

    #[inline]
    pub fn upper(&self) -> &Bound<Value> {
        &self.upper
    }

    #[inline]
    pub fn contains(&self, value: &Value) -> bool {
        RangeBounds::contains(self, value)
    }
}

impl RangeBounds<Value> for Interval {
    fn start_bound(&self) -> Bound<&Value> {
        self.lower.as_ref()
    }

    fn end_bound(&self) -> Bound<&Value> {
        self.upper.as_ref()
    }
}

impl Display for Interval {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match &self.lower {
            Bound::Unbounded => write!(formatter, "(-∞")?,
            Bound::Included(value) => write!(formatter, "[{value}")?,
            Bound::Excluded(value) => write!(formatter, "({value}")?,
        }
        match &self.upper {
            Bound::Unbounded => write!(formatter, ", +∞)"),
            Bound::Included(value) => write!(formatter, ", {value}]"),
            Bound::Excluded(value) => write!(formatter, ", {value})"),
        }
    }
}

/// A compiled pattern that must match an entire string value.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a `LIKE` pattern where `%` matches any sequence of characters and `_` matches any
    /// single character. The optional escape character makes the following character literal.
    pub fn like(pattern: &str, escape: Option<char>) -> Result<Self, regex::Error> {
        let mut translated = String::with_capacity(pattern.len() + 8);
        translated.push_str("(?s)^");
        let mut escaped = false;
        for character in pattern.chars() {
            if escaped {
                translated.push_str(&regex::escape(character.encode_utf8(&mut [0; 4])));
                escaped = false;
                continue;
            }

            match character {
                c if Some(c) == escape => escaped = true,
                '%' => translated.push_str(".*"),
                '_' => translated.push('.'),
                c => translated.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }
        if escaped {
            // A trailing escape character stands for itself.
            if let Some(escape) = escape {
                translated.push_str(&regex::escape(escape.encode_utf8(&mut [0; 4])));
            }
        }
        translated.push('$');

        Ok(Self {
            source: pattern.to_owned(),
            regex: Regex::new(&translated)?,
        })
    }

    /// Compile a regular expression that must match the whole value.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: pattern.to_owned(),
            regex: Regex::new(&format!("^(?:{pattern})$"))?,
        })
    }

    #[inline]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str()
    }
}

impl Display for Pattern {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        write!(formatter, "{}", self.source)
    }
}
