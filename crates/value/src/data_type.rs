//! Native column type tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of native column types a reflected schema can carry.
///
/// The tag for a column is decided once, when the table schema is created,
/// and all coercion and comparison logic dispatches on it with a `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Integer,
    Float,
    Decimal,
    Text,
    Date,
    Timestamp,
    Uuid,
}

impl DataType {
    /// Check if this type is numeric (integer, float, or decimal)
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float | DataType::Decimal)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DataType::Text)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Integer => write!(f, "BIGINT"),
            DataType::Float => write!(f, "DOUBLE PRECISION"),
            DataType::Decimal => write!(f, "DECIMAL"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Date => write!(f, "DATE"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Uuid => write!(f, "UUID"),
        }
    }
}
