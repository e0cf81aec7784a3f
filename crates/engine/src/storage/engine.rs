//! Fjall-backed store the engine reflects over and queries
//!
//! The store is the "live database": schemas live in a catalog partition
//! and each table's rows in a partition of their own. The query engine
//! only ever reads; the write API exists so a database can be seeded
//! before the engine opens it.

use crate::error::{Error, Result};
use crate::storage::config::StorageConfig;
use crate::storage::encoding::{deserialize, row_key, serialize, table_key, TABLE_KEY_PREFIX};
use crate::types::schema::TableSchema;
use fjall::{Keyspace, Partition, PartitionCreateOptions};
use parking_lot::RwLock;
use quarry_value::Row;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Metadata and data handle for one table.
struct TableData {
    schema: TableSchema,
    partition: Partition,
    next_row_id: AtomicU64,
}

/// The backing store.
pub struct Storage {
    keyspace: Keyspace,
    catalog_partition: Partition,
    tables: RwLock<HashMap<String, Arc<TableData>>>,
    config: StorageConfig,
}

impl Storage {
    /// Opens (or creates) a store at the configured directory and loads
    /// every persisted table schema.
    pub fn open(config: StorageConfig) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| Error::Configuration(format!("cannot create data_dir: {}", e)))?;

        let keyspace = fjall::Config::new(&config.data_dir)
            .cache_size(config.block_cache_size)
            .open()?;

        let catalog_partition = keyspace.open_partition(
            "_catalog",
            PartitionCreateOptions::default()
                .block_size(16 * 1024) // Small blocks for metadata
                .compression(fjall::CompressionType::None),
        )?;

        let mut tables = HashMap::new();
        for entry in catalog_partition.prefix(TABLE_KEY_PREFIX) {
            let (key, value) = entry?;
            let table_name = std::str::from_utf8(&key[TABLE_KEY_PREFIX.len()..])
                .map_err(|e| Error::Storage(format!("invalid table name: {}", e)))?
                .to_string();
            let schema: TableSchema = deserialize(&value)?;
            let data = Self::open_table(&keyspace, &config, &table_name, schema)?;
            tables.insert(table_name, Arc::new(data));
        }
        debug!(tables = tables.len(), "opened storage");

        Ok(Self {
            keyspace,
            catalog_partition,
            tables: RwLock::new(tables),
            config,
        })
    }

    fn open_table(
        keyspace: &Keyspace,
        config: &StorageConfig,
        name: &str,
        schema: TableSchema,
    ) -> Result<TableData> {
        let partition = keyspace.open_partition(
            &format!("{}_data", name),
            PartitionCreateOptions::default()
                .block_size(64 * 1024)
                .compression(config.compression),
        )?;

        // Resume row ids after the largest persisted key.
        let mut max_row_id = 0u64;
        for entry in partition.iter() {
            let (key, _) = entry?;
            if key.len() == 8 {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&key);
                max_row_id = max_row_id.max(u64::from_be_bytes(bytes));
            }
        }

        Ok(TableData {
            schema,
            partition,
            next_row_id: AtomicU64::new(max_row_id + 1),
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Creates a table, persisting its schema in the catalog partition.
    pub fn create_table(&self, schema: TableSchema) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(&schema.name) {
            return Err(Error::DuplicateTable(schema.name.clone()));
        }

        self.catalog_partition
            .insert(table_key(&schema.name), serialize(&schema)?)?;
        let name = schema.name.clone();
        let data = Self::open_table(&self.keyspace, &self.config, &name, schema)?;
        tables.insert(name, Arc::new(data));
        drop(tables);

        self.keyspace.persist(self.config.persist_mode)?;
        Ok(())
    }

    /// Appends one row, validating it against the table schema.
    pub fn insert(&self, table: &str, row: Row) -> Result<()> {
        let data = self.table(table)?;
        data.schema.validate_row(&row)?;

        let row_id = data.next_row_id.fetch_add(1, Ordering::SeqCst);
        data.partition.insert(row_key(row_id), serialize(&row)?)?;
        self.keyspace.persist(self.config.persist_mode)?;
        Ok(())
    }

    /// Reads every row of a table in insert order. The only read
    /// primitive the query executor uses.
    pub fn scan(&self, table: &str) -> Result<Vec<Row>> {
        let data = self.table(table)?;
        let mut rows = Vec::new();
        for entry in data.partition.iter() {
            let (_, value) = entry?;
            rows.push(deserialize(&value)?);
        }
        Ok(rows)
    }

    /// Every persisted table schema, for catalog reflection.
    pub fn schemas(&self) -> Vec<TableSchema> {
        self.tables
            .read()
            .values()
            .map(|data| data.schema.clone())
            .collect()
    }

    fn table(&self, name: &str) -> Result<Arc<TableData>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }
}
