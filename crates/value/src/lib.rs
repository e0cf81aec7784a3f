//! Quarry Value - typed values for reflected relational schemas
//!
//! This crate provides the value representation shared by the quarry
//! components:
//! - A closed set of native column type tags (`DataType`), decided once
//!   when a schema is created and never inferred afterwards.
//! - A `Value` enum covering every tag, with a total sort order and the
//!   equality/hashing needed to use values as join and group keys.
//! - String coercion: converting an untyped string into a column's
//!   native type, with the boolean special case handled explicitly.

pub mod coerce;
pub mod data_type;
pub mod types;

pub use coerce::{coerce, CoerceError};
pub use data_type::DataType;
pub use types::{Row, Value};
