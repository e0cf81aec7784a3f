//! Encoding for persisted schemas and rows

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key prefix for table schema records in the catalog partition.
pub const TABLE_KEY_PREFIX: &str = "table:";

pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| Error::Serialization(e.to_string()))
}

pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| Error::Serialization(e.to_string()))
}

/// Catalog partition key for a table's schema record.
pub fn table_key(name: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(TABLE_KEY_PREFIX.len() + name.len());
    key.extend_from_slice(TABLE_KEY_PREFIX.as_bytes());
    key.extend_from_slice(name.as_bytes());
    key
}

/// Row keys are big-endian row ids so scans come back in insert order.
pub fn row_key(row_id: u64) -> [u8; 8] {
    row_id.to_be_bytes()
}
