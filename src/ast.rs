use crate::values::Value;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// A boolean expression describing a filter.
///
/// This is the input of the compiler. It is expected to already be in negation normal form: a
/// [`BooleanExpr::Not`] may only wrap a null check or a pattern match since comparisons are
/// negated by flipping their operator instead.
#[derive(Clone, Debug, PartialEq)]
pub enum BooleanExpr {
    Constant(bool),
    Not(Box<BooleanExpr>),
    Comparison {
        path: String,
        operator: ComparisonOperator,
        value: Value,
    },
    IsNull {
        path: String,
    },
    Like {
        path: String,
        pattern: String,
        escape: Option<char>,
    },
    Regex {
        path: String,
        pattern: String,
    },
    And(Vec<BooleanExpr>),
    Or(Vec<BooleanExpr>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ComparisonOperator {
    Equal,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl BooleanExpr {
    pub fn and(children: impl IntoIterator<Item = BooleanExpr>) -> Self {
        Self::And(children.into_iter().collect())
    }

    pub fn or(children: impl IntoIterator<Item = BooleanExpr>) -> Self {
        Self::Or(children.into_iter().collect())
    }

    pub fn not(child: BooleanExpr) -> Self {
        Self::Not(Box::new(child))
    }

    pub fn comparison(path: &str, operator: ComparisonOperator, value: impl Into<Value>) -> Self {
        Self::Comparison {
            path: path.to_owned(),
            operator,
            value: value.into(),
        }
    }

    pub fn equal(path: &str, value: impl Into<Value>) -> Self {
        Self::comparison(path, ComparisonOperator::Equal, value)
    }

    pub fn less(path: &str, value: impl Into<Value>) -> Self {
        Self::comparison(path, ComparisonOperator::Less, value)
    }

    pub fn less_or_equal(path: &str, value: impl Into<Value>) -> Self {
        Self::comparison(path, ComparisonOperator::LessOrEqual, value)
    }

    pub fn greater(path: &str, value: impl Into<Value>) -> Self {
        Self::comparison(path, ComparisonOperator::Greater, value)
    }

    pub fn greater_or_equal(path: &str, value: impl Into<Value>) -> Self {
        Self::comparison(path, ComparisonOperator::GreaterOrEqual, value)
    }

    pub fn is_null(path: &str) -> Self {
        Self::IsNull {
            path: path.to_owned(),
        }
    }

    pub fn like(path: &str, pattern: &str) -> Self {
        Self::Like {
            path: path.to_owned(),
            pattern: pattern.to_owned(),
            escape: None,
        }
    }

    pub fn regex(path: &str, pattern: &str) -> Self {
        Self::Regex {
            path: path.to_owned(),
            pattern: pattern.to_owned(),
        }
    }

    /// Whether the expression is a single predicate (i.e. a leaf of the evaluation tree).
    #[inline]
    pub const fn is_predicate(&self) -> bool {
        matches!(
            self,
            Self::Comparison { .. } | Self::IsNull { .. } | Self::Like { .. } | Self::Regex { .. }
        )
    }
}

impl Display for BooleanExpr {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Constant(value) => write!(formatter, "{}", value.to_string().to_uppercase()),
            Self::Not(child) => write!(formatter, "NOT({child})"),
            Self::Comparison {
                path,
                operator,
                value,
            } => write!(formatter, "{path} {operator} {value}"),
            Self::IsNull { path } => write!(formatter, "{path} IS NULL"),
            Self::Like {
                path,
                pattern,
                escape: None,
            } => write!(formatter, "{path} LIKE '{pattern}'"),
            Self::Like {
                path,
                pattern,
                escape: Some(escape),
            } => write!(formatter, "{path} LIKE '{pattern}' ESCAPE '{escape}'"),
            Self::Regex { path, pattern } => write!(formatter, "{path} ~ '{pattern}'"),
            Self::And(children) => write!(formatter, "AND({})", children.iter().join(", ")),
            Self::Or(children) => write!(formatter, "OR({})", children.iter().join(", ")),
        }
    }
}

impl Display for ComparisonOperator {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Equal => write!(formatter, "="),
            Self::Less => write!(formatter, "<"),
            Self::LessOrEqual => write!(formatter, "<="),
            Self::Greater => write!(formatter, ">"),
            Self::GreaterOrEqual => write!(formatter, ">="),
        }
    }
}
