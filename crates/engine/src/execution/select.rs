//! Query execution and result shaping
//!
//! Assembles one query out of the request descriptors and runs it over
//! a pooled connection: scan, join, filter, sort, group, paginate,
//! project. The shaper labels output columns so that same-named columns
//! from two tables, and repeated aggregate functions, never collide.

use crate::error::Result;
use crate::execution::join;
use crate::filter;
use crate::functions;
use crate::resolver::{resolve_output, Scope, SelectItem};
use crate::storage::Connection;
use crate::types::query::{
    AggregateKind, ColumnMeta, ColumnSort, Direction, QueryArguments, QueryResult, ResultRows,
    RowShape,
};
use crate::types::schema::TableSchema;
use quarry_value::{Row, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Runs one query against a connection and shapes the result.
pub fn execute(
    conn: &Connection,
    base: &TableSchema,
    join_schema: Option<&TableSchema>,
    args: &QueryArguments,
) -> Result<QueryResult> {
    let scope = Scope::new(base, join_schema);

    let items = resolve_output(&args.columns, &scope);
    if items.is_empty() {
        // Nothing requested resolved; an empty result, not an error.
        return Ok(QueryResult::empty(args.shape));
    }

    // A join the caller cannot honor invalidates the result set, so
    // validate the pairs before touching any rows.
    let pairs = match (&args.join, join_schema) {
        (Some(descriptor), Some(target)) => Some(join::resolve_pairs(base, target, descriptor)?),
        _ => None,
    };

    let mut rows = conn.scan(&base.name)?;
    if let (Some(descriptor), Some(target), Some(pairs)) = (&args.join, join_schema, &pairs) {
        let right = conn.scan(&target.name)?;
        rows = join::hash_join(rows, right, pairs, target.columns.len(), descriptor.outer_join);
    }

    if let Some(tree) = &args.filter {
        if let Some(predicate) = filter::build_predicate(tree, &scope) {
            rows.retain(|row| predicate.matches(row));
        }
    }

    apply_sorts(&mut rows, &args.sorts, &scope);

    let group_columns: Vec<usize> = args
        .group_by
        .iter()
        .filter_map(|name| scope.resolve_group_key(name))
        .map(|column| scope.flat_index(&column))
        .collect();
    let has_functions = items.iter().any(|item| item.function.is_some());

    let projected = if has_functions || !group_columns.is_empty() {
        aggregate_rows(&rows, &items, &group_columns, &scope)
    } else {
        rows.iter()
            .map(|row| {
                items
                    .iter()
                    .map(|item| item.value_from(&scope, row))
                    .collect()
            })
            .collect()
    };

    let page = paginate(projected, args.page, args.per_page);
    debug!(table = %base.name, rows = page.len(), "query executed");

    let (labels, columns) = label_columns(&items, &scope);
    Ok(QueryResult {
        rows: shape_rows(page, &labels, args.shape),
        columns,
    })
}

/// Applies every resolvable sort as one stable multi-key comparison,
/// first sort outermost. Unresolvable sorts are skipped.
fn apply_sorts(rows: &mut [Row], sorts: &[ColumnSort], scope: &Scope) {
    let keys: Vec<(usize, Direction)> = sorts
        .iter()
        .filter_map(|sort| {
            scope
                .resolve_column(sort.table.as_deref(), &sort.column)
                .map(|column| (scope.flat_index(&column), sort.direction))
        })
        .collect();
    if keys.is_empty() {
        return;
    }

    rows.sort_by(|a, b| {
        for (index, direction) in &keys {
            let ordering = match direction {
                Direction::Ascending => a[*index].sort_cmp(&b[*index]),
                Direction::Descending => b[*index].sort_cmp(&a[*index]),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Groups rows by the group-by columns and projects one output row per
/// group, in first-appearance order of the (sorted) input. With no
/// group-by columns there is exactly one global group, even over zero
/// rows. Plain columns take their value from the first row of the
/// group; function columns accumulate over the whole group.
fn aggregate_rows(
    rows: &[Row],
    items: &[SelectItem],
    group_columns: &[usize],
    scope: &Scope,
) -> Vec<Vec<Value>> {
    if group_columns.is_empty() {
        let all: Vec<usize> = (0..rows.len()).collect();
        return vec![aggregate_group(rows, &all, items, scope)];
    }

    let mut order: Vec<Vec<Value>> = Vec::new();
    let mut buckets: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        let key: Vec<Value> = group_columns.iter().map(|&c| row[c].clone()).collect();
        if !buckets.contains_key(&key) {
            order.push(key.clone());
        }
        buckets.entry(key).or_default().push(i);
    }

    order
        .into_iter()
        .map(|key| aggregate_group(rows, &buckets[&key], items, scope))
        .collect()
}

fn aggregate_group(
    rows: &[Row],
    indices: &[usize],
    items: &[SelectItem],
    scope: &Scope,
) -> Vec<Value> {
    items
        .iter()
        .map(|item| match item.function {
            Some(kind) => {
                let mut accumulator = functions::accumulator(kind);
                for &i in indices {
                    accumulator.add(&item.value_from(scope, &rows[i]));
                }
                accumulator.finalize()
            }
            None => indices
                .first()
                .map(|&i| item.value_from(scope, &rows[i]))
                .unwrap_or(Value::Null),
        })
        .collect()
}

/// A negative page size disables limit and offset entirely; otherwise
/// the offset is the zero-based page index times the page size.
fn paginate(rows: Vec<Vec<Value>>, page: usize, per_page: i64) -> Vec<Vec<Value>> {
    if per_page < 0 {
        return rows;
    }
    let per_page = per_page as usize;
    rows.into_iter()
        .skip(page.saturating_mul(per_page))
        .take(per_page)
        .collect()
}

/// Output labels and column metadata, in output order.
///
/// Plain columns are keyed `table.column`; function pseudo-columns are
/// keyed by function name plus a 1-based per-function occurrence
/// counter, so two `count` columns become `count_1` and `count_2`.
fn label_columns(items: &[SelectItem], scope: &Scope) -> (Vec<String>, Vec<ColumnMeta>) {
    let mut counters: HashMap<AggregateKind, usize> = HashMap::new();
    let mut labels = Vec::with_capacity(items.len());
    let mut metas = Vec::with_capacity(items.len());

    for item in items {
        match item.function {
            Some(kind) => {
                let counter = counters.entry(kind).or_insert(0);
                *counter += 1;
                let label = format!("{}_{}", kind.as_str(), counter);
                metas.push(ColumnMeta::from_function(&label, kind));
                labels.push(label);
            }
            None => {
                let column = scope.column_schema(&item.column);
                let table = scope.table_name(&item.column);
                labels.push(format!("{}.{}", table, column.name));
                metas.push(ColumnMeta::from_column(column, table));
            }
        }
    }
    (labels, metas)
}

fn shape_rows(rows: Vec<Vec<Value>>, labels: &[String], shape: RowShape) -> ResultRows {
    match shape {
        RowShape::Values => ResultRows::Values(rows),
        RowShape::Records => ResultRows::Records(
            rows.into_iter()
                .map(|row| labels.iter().cloned().zip(row).collect())
                .collect(),
        ),
    }
}
