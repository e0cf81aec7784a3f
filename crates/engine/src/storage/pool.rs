//! Bounded connection pool
//!
//! Every query request acquires one connection for its whole lifetime
//! and nothing else. Acquisition is scoped: the guard returns the
//! connection on drop, so every exit path (success, validation
//! failure, execution error) releases it.

use crate::error::Result;
use crate::storage::engine::Storage;
use parking_lot::{Condvar, Mutex};
use quarry_value::Row;
use std::ops::Deref;
use std::sync::Arc;

/// One handle onto the backing store.
pub struct Connection {
    storage: Arc<Storage>,
}

impl Connection {
    pub fn scan(&self, table: &str) -> Result<Vec<Row>> {
        self.storage.scan(table)
    }
}

struct PoolShared {
    idle: Mutex<Vec<Connection>>,
    available: Condvar,
}

/// Fixed-size pool of connections over a shared store.
pub struct ConnectionPool {
    shared: Arc<PoolShared>,
}

impl ConnectionPool {
    pub fn new(storage: Arc<Storage>, size: usize) -> Self {
        let idle = (0..size.max(1))
            .map(|_| Connection {
                storage: storage.clone(),
            })
            .collect();
        ConnectionPool {
            shared: Arc::new(PoolShared {
                idle: Mutex::new(idle),
                available: Condvar::new(),
            }),
        }
    }

    /// Takes a connection, blocking until one is free.
    pub fn acquire(&self) -> PooledConnection {
        let mut idle = self.shared.idle.lock();
        while idle.is_empty() {
            self.shared.available.wait(&mut idle);
        }
        let connection = idle.pop().expect("pool not empty");
        PooledConnection {
            shared: self.shared.clone(),
            connection: Some(connection),
        }
    }
}

/// Scoped connection guard. Returns its connection to the pool on drop.
pub struct PooledConnection {
    shared: Arc<PoolShared>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.connection.as_ref().expect("connection present")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.shared.idle.lock().push(connection);
            self.shared.available.notify_one();
        }
    }
}
