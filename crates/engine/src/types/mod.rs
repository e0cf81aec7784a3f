//! Core types: reflected schemas, query descriptors, and results

pub mod query;
pub mod schema;

pub use query::{
    AggregateKind, ColumnMeta, ColumnPair, ColumnRef, ColumnSort, Direction, OpExpr,
    QueryArguments, QueryResult, ResultRows, RowShape, TableJoin, DEFAULT_PAGE, DEFAULT_PER_PAGE,
};
pub use schema::{ColumnSchema, ForeignKeyRef, TableSchema};
