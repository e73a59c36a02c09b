//! SQLite connection wrapper (one connection per CLI invocation / worker).

use crate::errors::AppResult;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> AppResult<Self> {
        Self::with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Open the database, waiting up to `busy_ms` for another writer's
    /// transaction before giving up with SQLITE_BUSY.
    pub fn with_busy_timeout(path: &str, busy_ms: u64) -> AppResult<Self> {
        let conn = Connection::open(Path::new(path))?;
        conn.busy_timeout(Duration::from_millis(busy_ms))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Start a write transaction that takes the store's write lock up front
    /// (`BEGIN IMMEDIATE`), so concurrent writers are serialized before any
    /// precondition is read.
    pub fn write_tx(&mut self) -> AppResult<Transaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(tx)
    }
}
