//! Query descriptors and result types
//!
//! Everything here is built per request by the transport layer, passed
//! whole into the engine, and discarded after the response is shaped.

use crate::error::{Error, Result};
use crate::filter::FilterNode;
use crate::types::schema::{ColumnSchema, ForeignKeyRef};
use quarry_value::{DataType, Row, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Default page index (zero-based).
pub const DEFAULT_PAGE: usize = 0;
/// Default page size. `-1` disables pagination entirely.
pub const DEFAULT_PER_PAGE: i64 = 50;

/// The aggregate functions a column reference may be wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateKind {
    Avg,
    Count,
    Min,
    Max,
    Sum,
}

impl AggregateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKind::Avg => "avg",
            AggregateKind::Count => "count",
            AggregateKind::Min => "min",
            AggregateKind::Max => "max",
            AggregateKind::Sum => "sum",
        }
    }
}

impl FromStr for AggregateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "avg" => Ok(AggregateKind::Avg),
            "count" => Ok(AggregateKind::Count),
            "min" => Ok(AggregateKind::Min),
            "max" => Ok(AggregateKind::Max),
            "sum" => Ok(AggregateKind::Sum),
            other => Err(Error::UnknownFunction(other.into())),
        }
    }
}

/// A raw operator override on a column reference: a custom operator
/// applied to the column with a literal operand, e.g. `price * 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpExpr {
    pub name: String,
    pub operand: String,
}

/// A request-time reference to an output column, possibly
/// table-qualified, operator-overridden, or function-wrapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
    pub function: Option<String>,
    pub op: Option<OpExpr>,
}

impl ColumnRef {
    /// Builds a reference from an optionally `table.column` qualified name.
    pub fn parse(name: &str) -> Self {
        let (table, column) = split_qualified(name);
        ColumnRef {
            table,
            column,
            function: None,
            op: None,
        }
    }

    /// Wraps the reference in an aggregate function.
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Applies a raw operator with a literal operand to the column.
    pub fn with_op(mut self, name: impl Into<String>, operand: impl Into<String>) -> Self {
        self.op = Some(OpExpr {
            name: name.into(),
            operand: operand.into(),
        });
        self
    }
}

/// Sort direction for ORDER BY terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Ascending),
            "desc" => Ok(Direction::Descending),
            other => Err(Error::InvalidSortDirection(other.into())),
        }
    }
}

/// One ordering instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSort {
    pub table: Option<String>,
    pub column: String,
    pub direction: Direction,
}

impl ColumnSort {
    pub fn new(name: &str, direction: Direction) -> Self {
        let (table, column) = split_qualified(name);
        ColumnSort {
            table,
            column,
            direction,
        }
    }
}

/// One equality pair of a join condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub from_column: String,
    pub to_column: String,
}

impl ColumnPair {
    pub fn new(from_column: impl Into<String>, to_column: impl Into<String>) -> Self {
        ColumnPair {
            from_column: from_column.into(),
            to_column: to_column.into(),
        }
    }
}

/// A single equi-join against one target table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableJoin {
    pub table_name: String,
    pub column_pairs: Vec<ColumnPair>,
    pub outer_join: bool,
}

impl TableJoin {
    /// Creates a join descriptor. A join always carries at least one pair.
    pub fn new(
        table_name: impl Into<String>,
        column_pairs: Vec<ColumnPair>,
        outer_join: bool,
    ) -> Result<Self> {
        if column_pairs.is_empty() {
            return Err(Error::EmptyJoin);
        }
        Ok(TableJoin {
            table_name: table_name.into(),
            column_pairs,
            outer_join,
        })
    }
}

/// Which shape the result rows take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowShape {
    /// Rows are mappings keyed by output label.
    #[default]
    Records,
    /// Rows are positional lists in output-column order.
    Values,
}

/// The full descriptor bundle for one query request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryArguments {
    /// Output columns. Empty means all base-table columns followed by all
    /// join-table columns, in schema order.
    pub columns: Vec<ColumnRef>,
    /// Zero-based page index.
    pub page: usize,
    /// Page size. Negative disables limit and offset.
    pub per_page: i64,
    pub filter: Option<FilterNode>,
    pub sorts: Vec<ColumnSort>,
    pub join: Option<TableJoin>,
    pub group_by: Vec<String>,
    pub shape: RowShape,
}

impl Default for QueryArguments {
    fn default() -> Self {
        QueryArguments {
            columns: Vec::new(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            filter: None,
            sorts: Vec::new(),
            join: None,
            group_by: Vec::new(),
            shape: RowShape::default(),
        }
    }
}

/// Metadata for one output column. Real columns carry the full reflected
/// description; function pseudo-columns carry the function name only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnMeta {
    Column {
        name: String,
        primary_key: bool,
        nullable: bool,
        #[serde(rename = "type")]
        datatype: DataType,
        foreign_keys: Vec<ForeignKeyRef>,
        table: String,
    },
    Function {
        name: String,
        table: String,
    },
}

impl ColumnMeta {
    pub fn from_column(column: &ColumnSchema, table: &str) -> Self {
        ColumnMeta::Column {
            name: column.name.clone(),
            primary_key: column.primary_key,
            nullable: column.nullable,
            datatype: column.datatype,
            foreign_keys: column.foreign_keys.clone(),
            table: table.to_string(),
        }
    }

    pub fn from_function(label: &str, function: AggregateKind) -> Self {
        ColumnMeta::Function {
            name: label.to_string(),
            table: function.as_str().to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ColumnMeta::Column { name, .. } => name,
            ColumnMeta::Function { name, .. } => name,
        }
    }
}

/// Result rows in the caller-selected shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultRows {
    Records(Vec<HashMap<String, Value>>),
    Values(Vec<Row>),
}

impl ResultRows {
    pub fn len(&self) -> usize {
        match self {
            ResultRows::Records(rows) => rows.len(),
            ResultRows::Values(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Engine output: ordered rows plus ordered column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub rows: ResultRows,
    pub columns: Vec<ColumnMeta>,
}

impl QueryResult {
    pub fn empty(shape: RowShape) -> Self {
        let rows = match shape {
            RowShape::Records => ResultRows::Records(Vec::new()),
            RowShape::Values => ResultRows::Values(Vec::new()),
        };
        QueryResult {
            rows,
            columns: Vec::new(),
        }
    }
}

/// Splits an optionally qualified `table.column` name into its parts.
pub(crate) fn split_qualified(name: &str) -> (Option<String>, String) {
    match name.split_once('.') {
        Some((table, column)) => (Some(table.to_string()), column.to_string()),
        None => (None, name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref_parsing() {
        let plain = ColumnRef::parse("name");
        assert_eq!(plain.table, None);
        assert_eq!(plain.column, "name");

        let qualified = ColumnRef::parse("users.name");
        assert_eq!(qualified.table.as_deref(), Some("users"));
        assert_eq!(qualified.column, "name");
    }

    #[test]
    fn test_aggregate_kind_parsing() {
        assert_eq!("avg".parse::<AggregateKind>().unwrap(), AggregateKind::Avg);
        assert_eq!("COUNT".parse::<AggregateKind>().unwrap(), AggregateKind::Count);
        assert_eq!(
            "median".parse::<AggregateKind>(),
            Err(Error::UnknownFunction("median".into()))
        );
    }

    #[test]
    fn test_join_requires_pairs() {
        assert_eq!(
            TableJoin::new("orders", vec![], false),
            Err(Error::EmptyJoin)
        );
        assert!(TableJoin::new("orders", vec![ColumnPair::new("id", "user_id")], false).is_ok());
    }

    #[test]
    fn test_sort_direction_parsing() {
        assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Ascending);
        assert_eq!("DESC".parse::<Direction>().unwrap(), Direction::Descending);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
