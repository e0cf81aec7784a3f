//! Column resolution
//!
//! Maps request-time column references onto the bounded set of in-scope
//! tables: the base table and, when a join is active, the join table.
//! Resolution is best-effort: a reference that names an unknown table,
//! column, operator, or function resolves to nothing and the caller
//! drops it rather than failing the request.

use crate::types::query::AggregateKind;
use crate::types::schema::{ColumnSchema, TableSchema};
use crate::types::ColumnRef;
use quarry_value::{coerce, DataType, Value};

/// Which in-scope table a resolved column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Base,
    Join,
}

/// A concrete column within the scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub side: Side,
    pub index: usize,
}

/// The bounded set of tables a request may reference. Join columns sit
/// after base columns in the combined row produced by the join applier.
pub struct Scope<'a> {
    base: &'a TableSchema,
    join: Option<&'a TableSchema>,
}

impl<'a> Scope<'a> {
    pub fn new(base: &'a TableSchema, join: Option<&'a TableSchema>) -> Self {
        Scope { base, join }
    }

    pub fn base(&self) -> &TableSchema {
        self.base
    }

    pub fn join(&self) -> Option<&TableSchema> {
        self.join
    }

    /// Width of the combined row.
    pub fn width(&self) -> usize {
        self.base.columns.len() + self.join.map_or(0, |j| j.columns.len())
    }

    /// Resolves an optionally qualified reference.
    ///
    /// A qualifier restricts the search to the table it names; a
    /// qualifier matching neither in-scope table fails. Unqualified
    /// references resolve against the base table only.
    pub fn resolve_column(&self, table: Option<&str>, column: &str) -> Option<ResolvedColumn> {
        match table {
            Some(name) if name == self.base.name => self.base_column(column),
            Some(name) => match self.join {
                Some(join) if name == join.name => join
                    .get_column(column)
                    .map(|(index, _)| ResolvedColumn {
                        side: Side::Join,
                        index,
                    }),
                _ => None,
            },
            None => self.base_column(column),
        }
    }

    /// Resolves a group-by name: base table first, then the join table.
    pub fn resolve_group_key(&self, name: &str) -> Option<ResolvedColumn> {
        if let Some((table, column)) = name.split_once('.') {
            return self.resolve_column(Some(table), column);
        }
        self.base_column(name).or_else(|| {
            self.join.and_then(|join| {
                join.get_column(name).map(|(index, _)| ResolvedColumn {
                    side: Side::Join,
                    index,
                })
            })
        })
    }

    fn base_column(&self, column: &str) -> Option<ResolvedColumn> {
        self.base.get_column(column).map(|(index, _)| ResolvedColumn {
            side: Side::Base,
            index,
        })
    }

    /// Index of a resolved column in the combined row.
    pub fn flat_index(&self, column: &ResolvedColumn) -> usize {
        match column.side {
            Side::Base => column.index,
            Side::Join => self.base.columns.len() + column.index,
        }
    }

    pub fn column_schema(&self, column: &ResolvedColumn) -> &ColumnSchema {
        match column.side {
            Side::Base => &self.base.columns[column.index],
            Side::Join => &self.join.expect("join column without join table").columns[column.index],
        }
    }

    pub fn table_name(&self, column: &ResolvedColumn) -> &str {
        match column.side {
            Side::Base => &self.base.name,
            Side::Join => &self.join.expect("join column without join table").name,
        }
    }
}

/// The closed set of raw operators a reference may apply to its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Concat,
}

impl BinaryOp {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            "%" => Some(BinaryOp::Rem),
            "||" => Some(BinaryOp::Concat),
            _ => None,
        }
    }
}

/// An operator override bound to its coerced operand.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOp {
    pub op: BinaryOp,
    pub operand: Value,
}

impl ResolvedOp {
    /// Applies the operator to a column value. Type errors and division
    /// by zero yield NULL rather than failing the row.
    pub fn apply(&self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        match self.op {
            BinaryOp::Concat => match (value, &self.operand) {
                (Value::Str(a), Value::Str(b)) => Value::Str(format!("{}{}", a, b)),
                _ => Value::Null,
            },
            op => numeric_apply(op, value, &self.operand),
        }
    }
}

fn numeric_apply(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(*b),
                BinaryOp::Sub => a.checked_sub(*b),
                BinaryOp::Mul => a.checked_mul(*b),
                BinaryOp::Div => a.checked_div(*b),
                BinaryOp::Rem => a.checked_rem(*b),
                BinaryOp::Concat => None,
            };
            result.map(Value::Integer).unwrap_or(Value::Null)
        }
        (Value::Float(a), Value::Float(b)) => {
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Rem => a % b,
                BinaryOp::Concat => return Value::Null,
            };
            Value::Float(result)
        }
        (Value::Decimal(a), Value::Decimal(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(*b),
                BinaryOp::Sub => a.checked_sub(*b),
                BinaryOp::Mul => a.checked_mul(*b),
                BinaryOp::Div => a.checked_div(*b),
                BinaryOp::Rem => a.checked_rem(*b),
                BinaryOp::Concat => None,
            };
            result.map(Value::Decimal).unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

/// One resolved output column: a concrete column, optionally transformed
/// by an operator override, optionally wrapped in an aggregate function.
/// A function-wrapped item is a pseudo-column: it is named after the
/// function, not the table.
pub struct SelectItem {
    pub column: ResolvedColumn,
    pub op: Option<ResolvedOp>,
    pub function: Option<AggregateKind>,
}

impl SelectItem {
    /// Reads this item's value out of a combined row, applying the
    /// operator override when present. Aggregation happens later.
    pub fn value_from(&self, scope: &Scope, row: &[Value]) -> Value {
        let value = row[scope.flat_index(&self.column)].clone();
        match &self.op {
            Some(op) => op.apply(&value),
            None => value,
        }
    }
}

/// Resolves a single reference, or nothing when any part of it (table
/// qualifier, column, operator, operand, or function name) is unknown.
pub fn resolve_ref(reference: &ColumnRef, scope: &Scope) -> Option<SelectItem> {
    let column = scope.resolve_column(reference.table.as_deref(), &reference.column)?;
    let datatype = scope.column_schema(&column).datatype;

    let op = match &reference.op {
        Some(op_expr) => Some(resolve_op(op_expr.name.as_str(), &op_expr.operand, datatype)?),
        None => None,
    };

    let function = match &reference.function {
        Some(name) => Some(name.parse::<AggregateKind>().ok()?),
        None => None,
    };

    Some(SelectItem {
        column,
        op,
        function,
    })
}

fn resolve_op(symbol: &str, operand: &str, datatype: DataType) -> Option<ResolvedOp> {
    let op = BinaryOp::from_symbol(symbol)?;
    match op {
        BinaryOp::Concat if datatype.is_text() => Some(ResolvedOp {
            op,
            operand: Value::Str(operand.to_string()),
        }),
        BinaryOp::Concat => None,
        _ if datatype.is_numeric() => {
            let operand = coerce(operand, &datatype).ok()?;
            Some(ResolvedOp { op, operand })
        }
        _ => None,
    }
}

/// The explicit default policy: no requested columns means every column
/// of the base table followed by every column of the join table, in
/// schema-declaration order.
pub fn all_columns(scope: &Scope) -> Vec<SelectItem> {
    let mut items: Vec<SelectItem> = (0..scope.base().columns.len())
        .map(|index| SelectItem {
            column: ResolvedColumn {
                side: Side::Base,
                index,
            },
            op: None,
            function: None,
        })
        .collect();

    if let Some(join) = scope.join() {
        items.extend((0..join.columns.len()).map(|index| SelectItem {
            column: ResolvedColumn {
                side: Side::Join,
                index,
            },
            op: None,
            function: None,
        }));
    }

    items
}

/// Resolves the requested output columns, dropping unresolvable
/// references. An empty request falls back to the all-columns default.
pub fn resolve_output(references: &[ColumnRef], scope: &Scope) -> Vec<SelectItem> {
    if references.is_empty() {
        return all_columns(scope);
    }
    references
        .iter()
        .filter_map(|reference| resolve_ref(reference, scope))
        .collect()
}
