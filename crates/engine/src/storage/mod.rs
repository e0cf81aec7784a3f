//! The backing store: fjall keyspace, persisted schemas, row scans,
//! and the bounded connection pool queries draw from.

pub mod config;
pub mod encoding;
pub mod engine;
pub mod pool;

pub use config::StorageConfig;
pub use engine::Storage;
pub use pool::{Connection, ConnectionPool, PooledConnection};
