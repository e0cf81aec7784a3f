//! A dynamic query engine over reflected relational schemas
//!
//! Callers browse an arbitrary schema and run parameterized ad-hoc
//! queries against any of its tables without writing SQL: pick a table,
//! optionally join one other table, filter rows with typed predicates,
//! sort, group, paginate, and apply aggregate functions, all expressed
//! as structured descriptors.
//!
//! The engine is read-only. The schema catalog is reflected once at
//! startup; each query request resolves its column references against
//! the base table and optional join table, builds a single predicate
//! out of its filter tree, and executes over a pooled connection into a
//! label-stable result shape.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod execution;
pub mod filter;
pub mod functions;
pub mod resolver;
pub mod storage;
pub mod types;

pub use catalog::Catalog;
pub use engine::QueryEngine;
pub use error::{Error, Result};
pub use filter::{ColumnFilter, Combinator, FilterKind, FilterNode};
pub use storage::{Storage, StorageConfig};
pub use types::{
    AggregateKind, ColumnMeta, ColumnPair, ColumnRef, ColumnSchema, ColumnSort, Direction,
    ForeignKeyRef, OpExpr, QueryArguments, QueryResult, ResultRows, RowShape, TableJoin,
    TableSchema,
};

pub use quarry_value::{DataType, Row, Value};
