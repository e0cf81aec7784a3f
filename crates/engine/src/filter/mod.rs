//! Typed column filters and the boolean filter tree
//!
//! Filters arrive as descriptors with raw string values and go through
//! two phases: construction (which validates the filter kind and splits
//! a `table.column` qualifier) and resolution (which binds a concrete
//! column and coerces the raw value into its native type exactly once).
//! A filter that fails resolution is dropped; the rest of the query
//! proceeds.

mod predicate;

pub use predicate::{CompareOp, Predicate};

use crate::error::{Error, Result};
use crate::resolver::Scope;
use quarry_value::coerce;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Separator for the value lists of `in`, `not_in`, `bt`, and `nbt`.
const LIST_SEPARATOR: char = ';';

/// The fixed set of filter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    Lt,
    Lte,
    Eq,
    Neq,
    Gt,
    Gte,
    In,
    NotIn,
    /// Inclusive range test.
    Bt,
    /// Negated inclusive range test.
    Nbt,
}

impl FilterKind {
    /// Kinds whose raw value is a `;`-delimited list.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            FilterKind::In | FilterKind::NotIn | FilterKind::Bt | FilterKind::Nbt
        )
    }
}

impl FromStr for FilterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lt" => Ok(FilterKind::Lt),
            "lte" => Ok(FilterKind::Lte),
            "eq" => Ok(FilterKind::Eq),
            "neq" => Ok(FilterKind::Neq),
            "gt" => Ok(FilterKind::Gt),
            "gte" => Ok(FilterKind::Gte),
            "in" => Ok(FilterKind::In),
            "not_in" => Ok(FilterKind::NotIn),
            "bt" => Ok(FilterKind::Bt),
            "nbt" => Ok(FilterKind::Nbt),
            other => Err(Error::InvalidFilterKind(other.into())),
        }
    }
}

/// One typed predicate descriptor on a column. Immutable once built;
/// binding to a column happens in `resolve`, which returns a separate
/// `Predicate` rather than mutating the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub table: Option<String>,
    pub column: String,
    pub kind: FilterKind,
    pub value: String,
}

impl ColumnFilter {
    /// Builds a filter from an optionally qualified column name, a kind
    /// name, and the raw value string. An unknown kind is rejected here,
    /// before the filter ever enters a tree.
    pub fn new(column_name: &str, kind: &str, value: &str) -> Result<Self> {
        let kind = kind.parse::<FilterKind>()?;
        let (table, column) = crate::types::query::split_qualified(column_name);
        Ok(ColumnFilter {
            table,
            column,
            kind,
            value: value.to_string(),
        })
    }

    /// The qualified name used to group same-column filters.
    fn qualified_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.column),
            None => self.column.clone(),
        }
    }
}

/// Boolean combinator for a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combinator {
    And,
    Or,
}

/// Recursive boolean combination of filters: a node is either a leaf
/// filter or a combinator over child nodes, so callers can express
/// shapes like `(a AND b) OR (c AND d)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterNode {
    Leaf(ColumnFilter),
    Group {
        combinator: Combinator,
        children: Vec<FilterNode>,
    },
}

impl FilterNode {
    pub fn and(children: Vec<FilterNode>) -> Self {
        FilterNode::Group {
            combinator: Combinator::And,
            children,
        }
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        FilterNode::Group {
            combinator: Combinator::Or,
            children,
        }
    }
}

impl From<ColumnFilter> for FilterNode {
    fn from(filter: ColumnFilter) -> Self {
        FilterNode::Leaf(filter)
    }
}

/// Binds a filter to a concrete column and coerces its raw value(s).
///
/// This is the only place coercion happens; the returned predicate is
/// immutable. Unresolvable columns and bad values are errors here; the
/// tree evaluator turns them into dropped children.
pub fn resolve(filter: &ColumnFilter, scope: &Scope) -> Result<Predicate> {
    let column = scope
        .resolve_column(filter.table.as_deref(), &filter.column)
        .ok_or_else(|| Error::ColumnNotFound(filter.qualified_name()))?;
    let datatype = scope.column_schema(&column).datatype;
    let index = scope.flat_index(&column);

    if filter.kind.is_list() {
        let values = filter
            .value
            .split(LIST_SEPARATOR)
            .map(|part| coerce(part, &datatype))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        return match filter.kind {
            FilterKind::In | FilterKind::NotIn => Ok(Predicate::InList {
                column: index,
                values,
                negated: filter.kind == FilterKind::NotIn,
            }),
            FilterKind::Bt | FilterKind::Nbt => {
                // A range test takes exactly two ordered values.
                let [low, high]: [_; 2] =
                    values.try_into().map_err(|_| Error::InvalidValue {
                        raw: filter.value.clone(),
                        datatype,
                    })?;
                Ok(Predicate::Between {
                    column: index,
                    low,
                    high,
                    negated: filter.kind == FilterKind::Nbt,
                })
            }
            _ => unreachable!("scalar kind in list branch"),
        };
    }

    let value = coerce(&filter.value, &datatype)?;
    let op = match filter.kind {
        FilterKind::Lt => CompareOp::Lt,
        FilterKind::Lte => CompareOp::Lte,
        FilterKind::Eq => CompareOp::Eq,
        FilterKind::Neq => CompareOp::Neq,
        FilterKind::Gt => CompareOp::Gt,
        FilterKind::Gte => CompareOp::Gte,
        _ => unreachable!("list kind in scalar branch"),
    };
    Ok(Predicate::Compare {
        column: index,
        op,
        value,
    })
}

/// Evaluates the root of a filter tree into at most one predicate.
///
/// Direct leaf children of the root that name the same column are
/// OR-combined first, and those per-column groups then combine with the
/// remaining children under the root combinator, so a column can carry
/// a disjunctive test while different columns' conditions still combine
/// conjunctively. Nested groups are evaluated exactly as written.
pub fn build_predicate(root: &FilterNode, scope: &Scope) -> Option<Predicate> {
    let (combinator, children) = match root {
        FilterNode::Leaf(_) => return evaluate(root, scope),
        FilterNode::Group {
            combinator,
            children,
        } => (*combinator, children),
    };

    let mut buckets: Vec<(String, Vec<Predicate>)> = Vec::new();
    let mut parts: Vec<Predicate> = Vec::new();

    for child in children {
        match child {
            FilterNode::Leaf(filter) => {
                // Dropped on resolution failure, never fatal.
                if let Ok(predicate) = resolve(filter, scope) {
                    let name = filter.qualified_name();
                    match buckets.iter_mut().find(|(n, _)| *n == name) {
                        Some((_, bucket)) => bucket.push(predicate),
                        None => buckets.push((name, vec![predicate])),
                    }
                }
            }
            group => {
                if let Some(predicate) = evaluate(group, scope) {
                    parts.push(predicate);
                }
            }
        }
    }

    let mut combined: Vec<Predicate> = buckets
        .into_iter()
        .map(|(_, bucket)| combine(Combinator::Or, bucket))
        .collect();
    combined.append(&mut parts);

    match combined.len() {
        0 => None,
        1 => combined.pop(),
        _ => Some(combine(combinator, combined)),
    }
}

/// Evaluates a non-root node: children first, failures dropped, then
/// zero survivors contribute nothing, one passes through unwrapped, and
/// several combine under the node's combinator.
fn evaluate(node: &FilterNode, scope: &Scope) -> Option<Predicate> {
    match node {
        FilterNode::Leaf(filter) => resolve(filter, scope).ok(),
        FilterNode::Group {
            combinator,
            children,
        } => {
            let survivors: Vec<Predicate> = children
                .iter()
                .filter_map(|child| evaluate(child, scope))
                .collect();
            match survivors.len() {
                0 => None,
                1 => survivors.into_iter().next(),
                _ => Some(combine(*combinator, survivors)),
            }
        }
    }
}

fn combine(combinator: Combinator, mut predicates: Vec<Predicate>) -> Predicate {
    if predicates.len() == 1 {
        return predicates.pop().expect("non-empty");
    }
    match combinator {
        Combinator::And => Predicate::And(predicates),
        Combinator::Or => Predicate::Or(predicates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::schema::{ColumnSchema, TableSchema};
    use quarry_value::{DataType, Value};

    fn products() -> TableSchema {
        TableSchema::new(
            "products",
            vec![
                ColumnSchema::new("id", DataType::Integer).primary_key(),
                ColumnSchema::new("price", DataType::Integer),
                ColumnSchema::new("status", DataType::Text),
                ColumnSchema::new("active", DataType::Boolean),
            ],
        )
        .unwrap()
    }

    fn product(id: i64, price: i64, status: &str, active: bool) -> Vec<Value> {
        vec![
            Value::integer(id),
            Value::integer(price),
            Value::string(status),
            Value::boolean(active),
        ]
    }

    #[test]
    fn test_unknown_kind_rejected_at_construction() {
        assert_eq!(
            ColumnFilter::new("price", "like", "x").unwrap_err(),
            Error::InvalidFilterKind("like".into())
        );
    }

    #[test]
    fn test_bad_value_is_resolution_error() {
        let table = products();
        let scope = Scope::new(&table, None);
        let filter = ColumnFilter::new("price", "lt", "abc").unwrap();
        assert!(matches!(
            resolve(&filter, &scope),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_between_needs_two_values() {
        let table = products();
        let scope = Scope::new(&table, None);
        let filter = ColumnFilter::new("price", "bt", "1;2;3").unwrap();
        assert!(resolve(&filter, &scope).is_err());

        let filter = ColumnFilter::new("price", "bt", "10;20").unwrap();
        let predicate = resolve(&filter, &scope).unwrap();
        assert!(predicate.matches(&product(1, 15, "active", true)));
        assert!(!predicate.matches(&product(1, 25, "active", true)));
    }

    #[test]
    fn test_boolean_value_coercion() {
        let table = products();
        let scope = Scope::new(&table, None);
        let filter = ColumnFilter::new("active", "eq", "TRUE").unwrap();
        let predicate = resolve(&filter, &scope).unwrap();
        assert!(predicate.matches(&product(1, 10, "active", true)));
        assert!(!predicate.matches(&product(1, 10, "active", false)));
    }

    #[test]
    fn test_same_column_filters_or_within_and_root() {
        let table = products();
        let scope = Scope::new(&table, None);

        let tree = FilterNode::and(vec![
            ColumnFilter::new("price", "lt", "60").unwrap().into(),
            ColumnFilter::new("price", "gt", "120").unwrap().into(),
            ColumnFilter::new("status", "eq", "active").unwrap().into(),
        ]);
        let predicate = build_predicate(&tree, &scope).unwrap();

        assert!(predicate.matches(&product(1, 50, "active", true)));
        assert!(predicate.matches(&product(2, 150, "active", true)));
        assert!(!predicate.matches(&product(3, 90, "active", true)));
        assert!(!predicate.matches(&product(4, 50, "inactive", true)));
    }

    #[test]
    fn test_failed_leaf_dropped_others_survive() {
        let table = products();
        let scope = Scope::new(&table, None);

        let tree = FilterNode::and(vec![
            ColumnFilter::new("price", "lt", "abc").unwrap().into(),
            ColumnFilter::new("status", "eq", "active").unwrap().into(),
        ]);
        let predicate = build_predicate(&tree, &scope).unwrap();

        // The malformed price filter is gone; only status applies.
        assert!(predicate.matches(&product(1, 999, "active", true)));
        assert!(!predicate.matches(&product(1, 999, "retired", true)));
    }

    #[test]
    fn test_all_children_failing_contributes_nothing() {
        let table = products();
        let scope = Scope::new(&table, None);

        let tree = FilterNode::and(vec![
            ColumnFilter::new("price", "lt", "abc").unwrap().into(),
            ColumnFilter::new("missing", "eq", "1").unwrap().into(),
        ]);
        assert_eq!(build_predicate(&tree, &scope), None);
    }

    #[test]
    fn test_single_survivor_passes_through_unwrapped() {
        let table = products();
        let scope = Scope::new(&table, None);

        let tree = FilterNode::or(vec![ColumnFilter::new("price", "lt", "60")
            .unwrap()
            .into()]);
        let predicate = build_predicate(&tree, &scope).unwrap();
        assert!(matches!(predicate, Predicate::Compare { .. }));
    }

    #[test]
    fn test_nested_groups_evaluate_as_written() {
        let table = products();
        let scope = Scope::new(&table, None);

        // (price < 60 AND status = active) OR (price > 120 AND status = retired)
        let tree = FilterNode::or(vec![
            FilterNode::and(vec![
                ColumnFilter::new("price", "lt", "60").unwrap().into(),
                ColumnFilter::new("status", "eq", "active").unwrap().into(),
            ]),
            FilterNode::and(vec![
                ColumnFilter::new("price", "gt", "120").unwrap().into(),
                ColumnFilter::new("status", "eq", "retired").unwrap().into(),
            ]),
        ]);
        let predicate = build_predicate(&tree, &scope).unwrap();

        assert!(predicate.matches(&product(1, 50, "active", true)));
        assert!(predicate.matches(&product(2, 150, "retired", true)));
        assert!(!predicate.matches(&product(3, 50, "retired", true)));
        assert!(!predicate.matches(&product(4, 150, "active", true)));
    }

    #[test]
    fn test_in_list_splits_on_semicolons() {
        let table = products();
        let scope = Scope::new(&table, None);
        let filter = ColumnFilter::new("status", "in", "new;active;trial").unwrap();
        let predicate = resolve(&filter, &scope).unwrap();
        assert!(predicate.matches(&product(1, 10, "trial", true)));
        assert!(!predicate.matches(&product(1, 10, "retired", true)));
    }
}
