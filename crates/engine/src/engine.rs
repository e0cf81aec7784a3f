//! The query engine façade
//!
//! Opens the backing store, reflects the catalog once, and serves
//! read-only queries. There is no cross-request shared mutable state:
//! descriptors, resolved columns, and predicates are all request-local.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::execution;
use crate::storage::{ConnectionPool, Storage, StorageConfig};
use crate::types::query::{QueryArguments, QueryResult};
use crate::types::schema::TableSchema;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub struct QueryEngine {
    catalog: Catalog,
    pool: ConnectionPool,
}

impl QueryEngine {
    /// Opens the store described by the config and reflects its schema.
    /// Fails fatally on incomplete configuration or an unopenable store;
    /// no query ever runs against a partially started engine.
    pub fn open(config: StorageConfig) -> Result<Self> {
        let storage = Arc::new(Storage::open(config)?);
        Self::with_storage(storage)
    }

    /// Builds an engine over an already opened (and possibly seeded)
    /// store.
    pub fn with_storage(storage: Arc<Storage>) -> Result<Self> {
        let catalog = Catalog::reflect(&storage)?;
        let pool_size = storage.config().pool_size;
        let pool = ConnectionPool::new(storage, pool_size);
        Ok(QueryEngine { catalog, pool })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// All tables grouped by schema namespace.
    pub fn list_tables(&self) -> BTreeMap<String, BTreeMap<String, TableSchema>> {
        self.catalog.list_tables()
    }

    /// Looks up one table, or a not-found error the transport layer can
    /// map onto its own representation.
    pub fn get_table(&self, name: &str) -> Result<&TableSchema> {
        self.catalog.get_table(name)
    }

    /// Runs one dynamic query against a table.
    ///
    /// The connection is acquired after validation of the table names
    /// and held in a scoped guard, so it is released on every exit path.
    pub fn query(&self, table_name: &str, args: &QueryArguments) -> Result<QueryResult> {
        let base = self.catalog.get_table(table_name)?;

        let join_schema = match &args.join {
            Some(join) => Some(
                self.catalog
                    .get_table(&join.table_name)
                    .map_err(|_| Error::JoinTableNotFound(join.table_name.clone()))?,
            ),
            None => None,
        };

        debug!(
            table = table_name,
            join = join_schema.map(|t| t.name.as_str()),
            "running query"
        );
        let conn = self.pool.acquire();
        execution::execute(&conn, base, join_schema, args)
    }
}
