//! Resolved filter predicates
//!
//! A `Predicate` is the immutable product of binding a filter descriptor
//! to a concrete column: values are already coerced, column references
//! are flat indexes into the combined row. One recursive evaluator
//! covers leaves and boolean combinations.

use quarry_value::Value;
use std::cmp::Ordering;

/// Scalar comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Lte,
    Eq,
    Neq,
    Gt,
    Gte,
}

impl CompareOp {
    fn matches(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Neq => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
        }
    }
}

/// One query predicate over a combined row.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: usize,
        op: CompareOp,
        value: Value,
    },
    InList {
        column: usize,
        values: Vec<Value>,
        negated: bool,
    },
    /// Inclusive range test on both ends.
    Between {
        column: usize,
        low: Value,
        high: Value,
        negated: bool,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Evaluates the predicate against a combined row. A NULL column
    /// value never matches any comparison, negated or not.
    pub fn matches(&self, row: &[Value]) -> bool {
        match self {
            Predicate::Compare { column, op, value } => {
                let cell = &row[*column];
                if cell.is_null() {
                    return false;
                }
                op.matches(cell.sort_cmp(value))
            }
            Predicate::InList {
                column,
                values,
                negated,
            } => {
                let cell = &row[*column];
                if cell.is_null() {
                    return false;
                }
                let contained = values.iter().any(|v| cell.sort_cmp(v) == Ordering::Equal);
                contained != *negated
            }
            Predicate::Between {
                column,
                low,
                high,
                negated,
            } => {
                let cell = &row[*column];
                if cell.is_null() {
                    return false;
                }
                let inside = cell.sort_cmp(low) != Ordering::Less
                    && cell.sort_cmp(high) != Ordering::Greater;
                inside != *negated
            }
            Predicate::And(children) => children.iter().all(|child| child.matches(row)),
            Predicate::Or(children) => children.iter().any(|child| child.matches(row)),
        }
    }
}
