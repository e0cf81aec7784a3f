//! Storage configuration

use crate::error::{Error, Result};
use fjall::{CompressionType, PersistMode};
use std::path::PathBuf;

/// Connection parameters for the backing store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base directory for storage files
    pub data_dir: PathBuf,

    /// Fjall block cache size in bytes
    pub block_cache_size: u64,

    /// Compression type for table data
    pub compression: CompressionType,

    /// Persistence mode for writes
    pub persist_mode: PersistMode,

    /// Number of pooled connections
    pub pool_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use tempfile to create a proper temporary directory
        // Using .keep() to persist the directory (won't be auto-deleted)
        let temp_dir = tempfile::tempdir()
            .expect("Failed to create temporary directory")
            .keep();

        Self {
            data_dir: temp_dir,
            block_cache_size: 64 * 1024 * 1024, // 64 MB
            compression: CompressionType::Lz4,
            persist_mode: PersistMode::Buffer,
            pool_size: 8,
        }
    }
}

impl StorageConfig {
    /// Create config rooted at an existing database directory.
    pub fn at_path(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Create config optimized for testing
    pub fn for_testing() -> Self {
        let temp_dir = tempfile::tempdir()
            .expect("Failed to create temporary directory")
            .keep();

        Self {
            data_dir: temp_dir,
            block_cache_size: 8 * 1024 * 1024,  // 8 MB
            compression: CompressionType::None, // Faster for tests
            persist_mode: PersistMode::Buffer,  // Don't sync to disk in tests
            pool_size: 4,
        }
    }

    /// Incomplete connection parameters are fatal before any query runs.
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::Configuration("\"data_dir\" is required".into()));
        }
        if self.pool_size == 0 {
            return Err(Error::Configuration(
                "\"pool_size\" must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
