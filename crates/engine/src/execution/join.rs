//! Equi-join execution
//!
//! One join target per query. The join condition is the conjunction of
//! every column pair, so a multi-pair join is a composite-key join.
//! Validation is strict: a pair naming a missing column invalidates the
//! whole request, unlike filters and sorts which degrade quietly.

use crate::error::{Error, Result};
use crate::types::query::TableJoin;
use crate::types::schema::TableSchema;
use quarry_value::{Row, Value};
use std::collections::HashMap;

/// Maps each column pair onto (base column index, join column index).
///
/// Fails with an invalid-join error naming the missing column and its
/// table; the caller aborts the request rather than dropping the join.
pub fn resolve_pairs(
    base: &TableSchema,
    join_table: &TableSchema,
    join: &TableJoin,
) -> Result<Vec<(usize, usize)>> {
    join.column_pairs
        .iter()
        .map(|pair| {
            let (from, _) = base.get_column(&pair.from_column).ok_or_else(|| {
                Error::InvalidJoin {
                    column: pair.from_column.clone(),
                    table: base.name.clone(),
                }
            })?;
            let (to, _) = join_table.get_column(&pair.to_column).ok_or_else(|| {
                Error::InvalidJoin {
                    column: pair.to_column.clone(),
                    table: join_table.name.clone(),
                }
            })?;
            Ok((from, to))
        })
        .collect()
}

/// Builds a hash table of right rows keyed on the join columns, then
/// probes it with each left row. All pairs must match simultaneously.
/// With `outer` set, unmatched left rows survive with NULL right
/// columns (left outer join). NULL keys never match.
pub fn hash_join(
    left: Vec<Row>,
    right: Vec<Row>,
    pairs: &[(usize, usize)],
    right_width: usize,
    outer: bool,
) -> Vec<Row> {
    let mut right_index: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
    for (i, row) in right.iter().enumerate() {
        if let Some(key) = join_key(row, pairs.iter().map(|(_, to)| *to)) {
            right_index.entry(key).or_default().push(i);
        }
    }

    let mut joined = Vec::new();
    for row in left {
        let matches = join_key(&row, pairs.iter().map(|(from, _)| *from))
            .and_then(|key| right_index.get(&key));

        match matches {
            Some(indices) => {
                for &i in indices {
                    let mut combined = row.clone();
                    combined.extend(right[i].iter().cloned());
                    joined.push(combined);
                }
            }
            None if outer => {
                let mut combined = row;
                combined.extend(std::iter::repeat_n(Value::Null, right_width));
                joined.push(combined);
            }
            None => {}
        }
    }
    joined
}

// A key containing NULL matches nothing.
fn join_key(row: &Row, columns: impl Iterator<Item = usize>) -> Option<Vec<Value>> {
    let mut key = Vec::new();
    for column in columns {
        let value = row.get(column)?;
        if value.is_null() {
            return None;
        }
        key.push(value.clone());
    }
    Some(key)
}
