//! Join behavior: single pair, composite key, outer, and validation

mod common;

use common::{setup_test, TestContext};
use quarry_engine::{
    ColumnPair, ColumnSchema, DataType, Error, QueryArguments, TableJoin, TableSchema, Value,
};

fn joined(join: TableJoin) -> QueryArguments {
    QueryArguments {
        join: Some(join),
        ..QueryArguments::default()
    }
}

fn users_orders_join(outer: bool) -> TableJoin {
    TableJoin::new("orders", vec![ColumnPair::new("id", "user_id")], outer).unwrap()
}

#[test]
fn test_inner_join_matches_only() {
    let ctx = setup_test();
    let records = ctx.records("users", &joined(users_orders_join(false)));

    // Alice has two orders, Bob one; Charlie and the unattributed order
    // drop out.
    assert_eq!(records.len(), 3);
    for row in &records {
        assert_ne!(row["orders.id"], Value::Null);
    }
}

#[test]
fn test_outer_join_keeps_unmatched_base_rows() {
    let ctx = setup_test();
    let records = ctx.records("users", &joined(users_orders_join(true)));

    assert_eq!(records.len(), 4);
    let charlie = records
        .iter()
        .find(|row| row["users.name"] == Value::string("Charlie"))
        .unwrap();
    assert_eq!(charlie["orders.id"], Value::Null);
    assert_eq!(charlie["orders.amount"], Value::Null);
}

#[test]
fn test_join_output_includes_both_tables_columns() {
    let ctx = setup_test();
    let result = ctx.query("users", &joined(users_orders_join(false)));

    let names: Vec<_> = result.columns.iter().map(|c| c.name().to_string()).collect();
    assert_eq!(
        names,
        vec!["id", "name", "age", "id", "user_id", "amount", "status"]
    );
}

#[test]
fn test_missing_join_column_aborts_request() {
    let ctx = setup_test();

    let join = TableJoin::new("orders", vec![ColumnPair::new("id", "customer_id")], false).unwrap();
    assert_eq!(
        ctx.engine.query("users", &joined(join)).unwrap_err(),
        Error::InvalidJoin {
            column: "customer_id".into(),
            table: "orders".into()
        }
    );

    let join = TableJoin::new("orders", vec![ColumnPair::new("uid", "user_id")], false).unwrap();
    assert_eq!(
        ctx.engine.query("users", &joined(join)).unwrap_err(),
        Error::InvalidJoin {
            column: "uid".into(),
            table: "users".into()
        }
    );
}

#[test]
fn test_missing_join_table_aborts_request() {
    let ctx = setup_test();
    let join = TableJoin::new("invoices", vec![ColumnPair::new("id", "user_id")], false).unwrap();
    assert_eq!(
        ctx.engine.query("users", &joined(join)).unwrap_err(),
        Error::JoinTableNotFound("invoices".into())
    );
}

#[test]
fn test_composite_key_join() {
    let levels = TableSchema::new(
        "stock_levels",
        vec![
            ColumnSchema::new("warehouse_id", DataType::Integer),
            ColumnSchema::new("product_id", DataType::Integer),
            ColumnSchema::new("quantity", DataType::Integer),
        ],
    )
    .unwrap();
    let locations = TableSchema::new(
        "stock_locations",
        vec![
            ColumnSchema::new("warehouse_id", DataType::Integer),
            ColumnSchema::new("product_id", DataType::Integer),
            ColumnSchema::new("aisle", DataType::Text),
        ],
    )
    .unwrap();

    let level_rows = vec![
        vec![Value::integer(1), Value::integer(10), Value::integer(5)],
        vec![Value::integer(1), Value::integer(11), Value::integer(7)],
        vec![Value::integer(2), Value::integer(10), Value::integer(9)],
    ];
    let location_rows = vec![
        vec![Value::integer(1), Value::integer(10), Value::string("A1")],
        vec![Value::integer(2), Value::integer(11), Value::string("B2")],
    ];

    let ctx = TestContext::with_tables(vec![(levels, level_rows), (locations, location_rows)]);

    // Both equalities must hold simultaneously.
    let both = TableJoin::new(
        "stock_locations",
        vec![
            ColumnPair::new("warehouse_id", "warehouse_id"),
            ColumnPair::new("product_id", "product_id"),
        ],
        false,
    )
    .unwrap();
    assert_eq!(ctx.row_count("stock_levels", &joined(both)), 1);

    // Omitting the second pair changes the matched row count.
    let first_only = TableJoin::new(
        "stock_locations",
        vec![ColumnPair::new("warehouse_id", "warehouse_id")],
        false,
    )
    .unwrap();
    assert_eq!(ctx.row_count("stock_levels", &joined(first_only)), 3);
}

#[test]
fn test_null_join_keys_never_match() {
    let ctx = setup_test();

    // The unattributed order has a NULL user_id; joining orders onto
    // users must not pair it with anyone.
    let join = TableJoin::new("users", vec![ColumnPair::new("user_id", "id")], false).unwrap();
    assert_eq!(ctx.row_count("orders", &joined(join)), 3);

    // Outer join keeps it, padded with NULLs.
    let join = TableJoin::new("users", vec![ColumnPair::new("user_id", "id")], true).unwrap();
    let records = ctx.records("orders", &joined(join));
    assert_eq!(records.len(), 4);
    let draft = records
        .iter()
        .find(|row| row["orders.status"] == Value::string("draft"))
        .unwrap();
    assert_eq!(draft["users.name"], Value::Null);
}
