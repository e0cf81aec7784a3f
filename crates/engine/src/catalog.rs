//! Schema catalog
//!
//! Reflected once, eagerly, when the engine opens; read-only for the
//! rest of the process lifetime, so lookups need no locking.

use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::types::schema::TableSchema;
use std::collections::BTreeMap;
use tracing::info;

/// Namespace reported for tables that carry none.
const DEFAULT_NAMESPACE: &str = "public";

/// The immutable description of every table visible in the store.
pub struct Catalog {
    tables: BTreeMap<String, TableSchema>,
}

impl Catalog {
    /// Reflects every table schema out of the store.
    pub fn reflect(storage: &Storage) -> Result<Self> {
        let tables: BTreeMap<String, TableSchema> = storage
            .schemas()
            .into_iter()
            .map(|schema| (schema.name.clone(), schema))
            .collect();
        info!(tables = tables.len(), "reflected schema catalog");
        Ok(Catalog { tables })
    }

    /// All tables grouped by schema namespace.
    pub fn list_tables(&self) -> BTreeMap<String, BTreeMap<String, TableSchema>> {
        let mut namespaces: BTreeMap<String, BTreeMap<String, TableSchema>> = BTreeMap::new();
        for table in self.tables.values() {
            let namespace = table
                .schema
                .clone()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
            namespaces
                .entry(namespace)
                .or_default()
                .insert(table.name.clone(), table.clone());
        }
        namespaces
    }

    /// Looks a table up by name.
    pub fn get_table(&self, name: &str) -> Result<&TableSchema> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
