//! Value types for quarry components

use crate::data_type::DataType;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A row of values in a table
pub type Row = Vec<Value>;

/// A typed value, one variant per native column type plus NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Str(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
}

impl Value {
    /// Create an integer value
    pub fn integer(i: i64) -> Self {
        Value::Integer(i)
    }

    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Create a boolean value
    pub fn boolean(b: bool) -> Self {
        Value::Bool(b)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type tag of this value. NULL carries no tag.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Boolean),
            Value::Integer(_) => Some(DataType::Integer),
            Value::Float(_) => Some(DataType::Float),
            Value::Decimal(_) => Some(DataType::Decimal),
            Value::Str(_) => Some(DataType::Text),
            Value::Date(_) => Some(DataType::Date),
            Value::Timestamp(_) => Some(DataType::Timestamp),
            Value::Uuid(_) => Some(DataType::Uuid),
        }
    }

    /// Check that a non-null value matches a column's type tag.
    pub fn matches_type(&self, datatype: &DataType) -> bool {
        match self {
            Value::Null => true,
            v => v.data_type().as_ref() == Some(datatype),
        }
    }

    /// Numeric view of the value as a decimal, when it has one.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(i) => Some(Decimal::from(*i)),
            Value::Float(f) => Decimal::try_from(*f).ok(),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Total sort order used by ORDER BY and range filters.
    ///
    /// Values of the same tag compare natively; the numeric tags compare
    /// with each other by magnitude; NULL sorts after every non-null
    /// value. Remaining cross-tag pairs fall back to a fixed tag rank so
    /// the order is total.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Greater,
            (_, Null) => Ordering::Less,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Decimal(a), Decimal(b)) => a.cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (Uuid(a), Uuid(b)) => a.cmp(b),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                match (a.as_decimal(), b.as_decimal()) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    _ => a.tag_rank().cmp(&b.tag_rank()),
                }
            }
            (a, b) => a.tag_rank().cmp(&b.tag_rank()),
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_) | Value::Decimal(_))
    }

    fn tag_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Integer(_) => 2,
            Value::Float(_) => 3,
            Value::Decimal(_) => 4,
            Value::Str(_) => 5,
            Value::Date(_) => 6,
            Value::Timestamp(_) => 7,
            Value::Uuid(_) => 8,
        }
    }
}

// Values serve as join and group keys, so they need Eq + Hash. Floats are
// keyed by bit pattern; NaN keys never occur in reflected data.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag_rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Decimal(d) => d.hash(state),
            Value::Str(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Timestamp(t) => t.hash(state),
            Value::Uuid(u) => u.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Str(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Timestamp(t) => write!(f, "{}", t),
            Value::Uuid(u) => write!(f, "{}", u),
        }
    }
}
