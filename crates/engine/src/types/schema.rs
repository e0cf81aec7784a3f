//! Schema types for reflected tables and columns
//!
//! Schemas are built once, at reflection or table creation, and are
//! immutable afterwards. Every later request performs read-only lookups.

use crate::error::{Error, Result};
use quarry_value::{DataType, Row};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A foreign key target: the referenced column and its owning table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub name: String,
    pub table_name: String,
}

/// One reflected table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// The table name. Unique across the catalog. Can't be empty.
    pub name: String,
    /// Schema namespace the table lives in, if any.
    pub schema: Option<String>,
    /// The table's columns, in declaration order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Creates a new table schema.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Configuration("table name cannot be empty".into()));
        }

        let primary_keys = columns.iter().filter(|c| c.primary_key).count();
        if primary_keys > 1 {
            return Err(Error::Configuration(format!(
                "table {} has {} primary key columns, at most one is supported",
                name, primary_keys
            )));
        }
        if let Some(pk) = columns.iter().find(|c| c.primary_key) {
            if pk.nullable {
                return Err(Error::Configuration(format!(
                    "primary key column {} cannot be nullable",
                    pk.name
                )));
            }
        }

        Ok(TableSchema {
            name,
            schema: None,
            columns,
        })
    }

    /// Places the table in a schema namespace.
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.schema = Some(namespace.into());
        self
    }

    /// Returns the column with the given name, if it exists.
    pub fn get_column(&self, name: &str) -> Option<(usize, &ColumnSchema)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
    }

    /// Validates a row against this table's schema.
    pub fn validate_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::TypeMismatch {
                expected: format!("{} columns", self.columns.len()),
                found: format!("{} values", row.len()),
            });
        }

        for (column, value) in self.columns.iter().zip(row.iter()) {
            if value.is_null() {
                if !column.nullable {
                    return Err(Error::NullConstraintViolation(column.name.clone()));
                }
                continue;
            }
            if !value.matches_type(&column.datatype) {
                return Err(Error::TypeMismatch {
                    expected: format!("{} for column {}", column.datatype, column.name),
                    found: value
                        .data_type()
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "NULL".into()),
                });
            }
        }

        Ok(())
    }
}

/// One reflected column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name. Can't be empty.
    pub name: String,
    /// Native type tag, decided once at creation.
    pub datatype: DataType,
    /// Whether this is the primary key column.
    pub primary_key: bool,
    /// Whether the column allows null values. Not legal for primary keys.
    pub nullable: bool,
    /// Foreign key targets this column references.
    pub foreign_keys: Vec<ForeignKeyRef>,
}

impl ColumnSchema {
    /// Creates a new nullable column.
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        ColumnSchema {
            name: name.into(),
            datatype,
            primary_key: false,
            nullable: true,
            foreign_keys: Vec::new(),
        }
    }

    /// Sets this column as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Sets whether this column is nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        if self.primary_key && nullable {
            return self;
        }
        self.nullable = nullable;
        self
    }

    /// Adds a foreign key reference to another table's column.
    pub fn references(mut self, column: impl Into<String>, table: impl Into<String>) -> Self {
        self.foreign_keys.push(ForeignKeyRef {
            name: column.into(),
            table_name: table.into(),
        });
        self
    }
}

// Formats the table as a SQL CREATE TABLE statement.
impl Display for TableSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "CREATE TABLE {} (", self.name)?;
        for (i, column) in self.columns.iter().enumerate() {
            write!(f, "  {} {}", column.name, column.datatype)?;
            if column.primary_key {
                write!(f, " PRIMARY KEY")?;
            } else if !column.nullable {
                write!(f, " NOT NULL")?;
            }
            for fk in &column.foreign_keys {
                write!(f, " REFERENCES {} ({})", fk.table_name, fk.name)?;
            }
            if i < self.columns.len() - 1 {
                writeln!(f, ",")?;
            }
        }
        writeln!(f, "\n)")
    }
}
