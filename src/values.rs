use rust_decimal::Decimal;
use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
};

/// A single attribute value, as found on a data instance or as a literal inside a boolean
/// expression.
///
/// An absent (null) attribute is not a [`Value`]; it is represented by `None` wherever a value is
/// expected (i.e. `Option<&Value>`).
///
/// Integers and floats holding the same number are equal.
#[derive(Clone, Debug)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(Decimal),
    String(String),
}

impl Value {
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

/// Values of the same kind are ordered naturally while integers and floats are compared
/// numerically. Every other combination is unordered, which means that it can never be contained
/// by an interval.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Float(b)) => Decimal::from(*a).partial_cmp(b),
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&Decimal::from(*b)),
            (Self::String(a), Self::String(b)) => a.partial_cmp(b),
            (_, _) => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Boolean(value) => {
                0u8.hash(state);
                value.hash(state);
            }
            // Decimals hash their normalized form, so `3` and `3.0` collide as they should.
            Self::Integer(value) => {
                1u8.hash(state);
                Decimal::from(*value).hash(state);
            }
            Self::Float(value) => {
                1u8.hash(state);
                value.hash(state);
            }
            Self::String(value) => {
                2u8.hash(state);
                value.hash(state);
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Boolean(value) => write!(formatter, "{value}"),
            Self::Integer(value) => write!(formatter, "{value}"),
            Self::Float(value) => write!(formatter, "{value}"),
            Self::String(value) => write!(formatter, "'{value}'"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
