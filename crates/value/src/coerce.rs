//! String coercion into native column types
//!
//! Filter and operator values arrive as untyped strings. They are coerced
//! into the owning column's native type exactly once, when the column is
//! bound; after that the typed value is immutable.

use crate::data_type::DataType;
use crate::types::Value;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid value \"{raw}\" for type {target}")]
pub struct CoerceError {
    pub raw: String,
    pub target: DataType,
}

impl CoerceError {
    fn new(raw: &str, target: DataType) -> Self {
        Self {
            raw: raw.to_string(),
            target,
        }
    }
}

/// Coerce a raw string into the given native type.
///
/// Booleans never fail: `"true"` in any casing is true, anything else is
/// false. Every other tag parses with its native parser and reports a
/// `CoerceError` naming the input and the target type.
pub fn coerce(raw: &str, target: &DataType) -> Result<Value, CoerceError> {
    match target {
        DataType::Boolean => Ok(Value::Bool(raw.eq_ignore_ascii_case("true"))),
        DataType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| CoerceError::new(raw, *target)),
        DataType::Float => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| CoerceError::new(raw, *target)),
        DataType::Decimal => raw
            .trim()
            .parse::<Decimal>()
            .map(Value::Decimal)
            .map_err(|_| CoerceError::new(raw, *target)),
        DataType::Text => Ok(Value::Str(raw.to_string())),
        DataType::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| CoerceError::new(raw, *target)),
        DataType::Timestamp => parse_timestamp(raw.trim())
            .map(Value::Timestamp)
            .ok_or_else(|| CoerceError::new(raw, *target)),
        DataType::Uuid => Uuid::parse_str(raw.trim())
            .map(Value::Uuid)
            .map_err(|_| CoerceError::new(raw, *target)),
    }
}

// Accepts both the space-separated and the `T`-separated timestamp forms.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
