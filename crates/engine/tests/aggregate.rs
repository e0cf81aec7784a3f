//! Aggregate functions and grouping through the full query path

mod common;

use common::setup_test;
use quarry_engine::{
    ColumnFilter, ColumnMeta, ColumnRef, QueryArguments, Value,
};
use rust_decimal::Decimal;

fn aggregate_args(columns: Vec<ColumnRef>) -> QueryArguments {
    QueryArguments {
        columns,
        ..QueryArguments::default()
    }
}

#[test]
fn test_global_aggregates_yield_one_row() {
    let ctx = setup_test();

    let args = aggregate_args(vec![
        ColumnRef::parse("amount").with_function("count"),
        ColumnRef::parse("amount").with_function("sum"),
        ColumnRef::parse("amount").with_function("min"),
        ColumnRef::parse("amount").with_function("max"),
    ]);
    let records = ctx.records("orders", &args);

    assert_eq!(records.len(), 1);
    let row = &records[0];
    assert_eq!(row["count_1"], Value::integer(4));
    assert_eq!(row["sum_1"], Value::integer(525));
    assert_eq!(row["min_1"], Value::integer(75));
    assert_eq!(row["max_1"], Value::integer(200));
}

#[test]
fn test_avg_of_integers_is_exact() {
    let ctx = setup_test();

    let args = aggregate_args(vec![ColumnRef::parse("age").with_function("avg")]);
    let records = ctx.records("users", &args);
    assert_eq!(records[0]["avg_1"], Value::Decimal(Decimal::from(30)));
}

#[test]
fn test_repeated_functions_get_distinct_labels() {
    let ctx = setup_test();

    let args = aggregate_args(vec![
        ColumnRef::parse("id").with_function("count"),
        ColumnRef::parse("user_id").with_function("count"),
    ]);
    let result = ctx.query("orders", &args);

    let labels: Vec<_> = result.columns.iter().map(|c| c.name().to_string()).collect();
    assert_eq!(labels, vec!["count_1", "count_2"]);

    let records = ctx.records("orders", &args);
    // id is never NULL, user_id is NULL once; no collision, no overwrite.
    assert_eq!(records[0]["count_1"], Value::integer(4));
    assert_eq!(records[0]["count_2"], Value::integer(3));
}

#[test]
fn test_function_column_metadata() {
    let ctx = setup_test();

    let args = aggregate_args(vec![ColumnRef::parse("amount").with_function("sum")]);
    let result = ctx.query("orders", &args);
    assert_eq!(
        result.columns,
        vec![ColumnMeta::Function {
            name: "sum_1".into(),
            table: "sum".into()
        }]
    );
}

#[test]
fn test_grouped_aggregates() {
    let ctx = setup_test();

    let args = QueryArguments {
        columns: vec![
            ColumnRef::parse("status"),
            ColumnRef::parse("amount").with_function("sum"),
            ColumnRef::parse("id").with_function("count"),
        ],
        group_by: vec!["status".into()],
        ..QueryArguments::default()
    };
    let records = ctx.records("orders", &args);

    assert_eq!(records.len(), 3);
    let paid = records
        .iter()
        .find(|row| row["orders.status"] == Value::string("paid"))
        .unwrap();
    assert_eq!(paid["sum_1"], Value::integer(250));
    assert_eq!(paid["count_1"], Value::integer(2));
}

#[test]
fn test_aggregate_over_no_rows() {
    let ctx = setup_test();

    let args = QueryArguments {
        columns: vec![
            ColumnRef::parse("amount").with_function("count"),
            ColumnRef::parse("amount").with_function("sum"),
        ],
        filter: Some(ColumnFilter::new("amount", "gt", "9000").unwrap().into()),
        ..QueryArguments::default()
    };
    let records = ctx.records("orders", &args);

    // The global group exists even over zero rows.
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["count_1"], Value::integer(0));
    assert_eq!(records[0]["sum_1"], Value::Null);
}

#[test]
fn test_grouped_query_without_functions_collapses() {
    let ctx = setup_test();

    let args = QueryArguments {
        columns: vec![ColumnRef::parse("status")],
        group_by: vec!["status".into()],
        ..QueryArguments::default()
    };
    assert_eq!(ctx.row_count("orders", &args), 3);
}
