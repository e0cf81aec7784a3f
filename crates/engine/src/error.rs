//! Error types for the query engine

use quarry_value::{CoerceError, DataType};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Startup errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Catalog errors
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    DuplicateTable(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    // Join errors; never silently dropped, unlike filters and sorts
    #[error("invalid join: \"{column}\" is not a column on table \"{table}\"")]
    InvalidJoin { column: String, table: String },

    #[error("invalid join: table \"{0}\" does not exist")]
    JoinTableNotFound(String),

    // Descriptor errors
    #[error("invalid filter kind: {0}")]
    InvalidFilterKind(String),

    #[error("invalid value \"{raw}\" for type {datatype}")]
    InvalidValue { raw: String, datatype: DataType },

    #[error("invalid sort direction: {0}")]
    InvalidSortDirection(String),

    #[error("unknown aggregate function: {0}")]
    UnknownFunction(String),

    #[error("join requires at least one column pair")]
    EmptyJoin,

    // Row validation errors (seeding path)
    #[error("NULL constraint violation on column: {0}")]
    NullConstraintViolation(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    // System errors
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<CoerceError> for Error {
    fn from(err: CoerceError) -> Self {
        Error::InvalidValue {
            raw: err.raw,
            datatype: err.target,
        }
    }
}

impl From<fjall::Error> for Error {
    fn from(err: fjall::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
