//! Common test utilities for engine integration tests
#![allow(dead_code)]

use quarry_engine::{
    ColumnSchema, DataType, QueryArguments, QueryEngine, QueryResult, ResultRows, Row, Storage,
    StorageConfig, TableSchema, Value,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Test context holding an engine over a seeded store.
pub struct TestContext {
    pub engine: QueryEngine,
}

impl TestContext {
    /// Engine over the standard fixture tables.
    pub fn new() -> Self {
        Self::with_tables(standard_tables())
    }

    /// Engine over caller-provided tables and rows.
    pub fn with_tables(tables: Vec<(TableSchema, Vec<Row>)>) -> Self {
        let storage = Storage::open(StorageConfig::for_testing()).unwrap();
        for (schema, rows) in tables {
            let name = schema.name.clone();
            storage.create_table(schema).unwrap();
            for row in rows {
                storage.insert(&name, row).unwrap();
            }
        }
        let engine = QueryEngine::with_storage(Arc::new(storage)).unwrap();
        TestContext { engine }
    }

    /// Runs a query, panicking on failure.
    pub fn query(&self, table: &str, args: &QueryArguments) -> QueryResult {
        self.engine
            .query(table, args)
            .unwrap_or_else(|e| panic!("query against {} failed: {}", table, e))
    }

    /// Runs a query and returns its rows as label-keyed records.
    pub fn records(&self, table: &str, args: &QueryArguments) -> Vec<HashMap<String, Value>> {
        match self.query(table, args).rows {
            ResultRows::Records(rows) => rows,
            ResultRows::Values(_) => panic!("expected record-shaped rows"),
        }
    }

    /// Runs a query and returns its row count.
    pub fn row_count(&self, table: &str, args: &QueryArguments) -> usize {
        self.query(table, args).rows.len()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The standard fixture: three users, four orders (one unattributed),
/// and six products spanning the filterable types.
fn standard_tables() -> Vec<(TableSchema, Vec<Row>)> {
    let users = TableSchema::new(
        "users",
        vec![
            ColumnSchema::new("id", DataType::Integer).primary_key(),
            ColumnSchema::new("name", DataType::Text).nullable(false),
            ColumnSchema::new("age", DataType::Integer),
        ],
    )
    .unwrap();
    let user_rows = vec![
        user(1, "Alice", 25),
        user(2, "Bob", 30),
        user(3, "Charlie", 35),
    ];

    let orders = TableSchema::new(
        "orders",
        vec![
            ColumnSchema::new("id", DataType::Integer).primary_key(),
            ColumnSchema::new("user_id", DataType::Integer).references("id", "users"),
            ColumnSchema::new("amount", DataType::Integer),
            ColumnSchema::new("status", DataType::Text),
        ],
    )
    .unwrap();
    let order_rows = vec![
        order(1, Some(1), 100, "paid"),
        order(2, Some(1), 200, "pending"),
        order(3, Some(2), 150, "paid"),
        order(4, None, 75, "draft"),
    ];

    let products = TableSchema::new(
        "products",
        vec![
            ColumnSchema::new("id", DataType::Integer).primary_key(),
            ColumnSchema::new("name", DataType::Text).nullable(false),
            ColumnSchema::new("price", DataType::Integer),
            ColumnSchema::new("status", DataType::Text),
            ColumnSchema::new("in_stock", DataType::Boolean),
        ],
    )
    .unwrap();
    let product_rows = vec![
        product(1, "widget", 50, "active", true),
        product(2, "gadget", 90, "active", true),
        product(3, "gizmo", 150, "active", false),
        product(4, "doohickey", 50, "inactive", true),
        product(5, "sprocket", 130, "inactive", false),
        product(6, "flange", 60, "active", true),
    ];

    vec![
        (users, user_rows),
        (orders, order_rows),
        (products, product_rows),
    ]
}

fn user(id: i64, name: &str, age: i64) -> Row {
    vec![Value::integer(id), Value::string(name), Value::integer(age)]
}

fn order(id: i64, user_id: Option<i64>, amount: i64, status: &str) -> Row {
    vec![
        Value::integer(id),
        user_id.map(Value::integer).unwrap_or(Value::Null),
        Value::integer(amount),
        Value::string(status),
    ]
}

fn product(id: i64, name: &str, price: i64, status: &str, in_stock: bool) -> Row {
    vec![
        Value::integer(id),
        Value::string(name),
        Value::integer(price),
        Value::string(status),
        Value::boolean(in_stock),
    ]
}

/// Shared setup helper.
pub fn setup_test() -> TestContext {
    TestContext::new()
}
