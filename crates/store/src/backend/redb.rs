//! Redb (Rust embedded database) backend for pattern shards.
//!
//! The database is produced by the rule build and opened here for reading
//! only. Shards live in a single table keyed by the textual [`ShardKey`]:
//!
//! ```text
//! pattern_shards: "patterns.<shard>" -> UTF-8 record lines
//! ```
//!
//! Async access moves each read transaction onto tokio's blocking pool.

use std::path::Path;
use std::sync::Arc;

use ::redb::{Database, ReadableTable, TableDefinition, TableError};
use async_trait::async_trait;
use keys::ShardKey;

use crate::{AsyncShardStore, ShardStore, StoreError};

/// Table holding one serialized record list per shard.
pub const SHARD_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("pattern_shards");

/// Read-only shard store over a redb file.
///
/// # Thread Safety
/// The `Arc<Database>` wrapper allows sharing across threads and with
/// blocking tasks. Redb handles its own internal locking and MVCC.
pub struct RedbShardStore {
    db: Arc<Database>,
}

impl RedbShardStore {
    /// Open an existing database at `path`.
    ///
    /// # Example
    /// ```no_run
    /// use store::RedbShardStore;
    ///
    /// let store = RedbShardStore::open("/data/patterns.redb").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::open(path).map_err(|e| StoreError::backend(e.to_string()))?;
        Ok(Self::from_database(db))
    }

    /// Wrap an already-open database handle.
    pub fn from_database(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }
}

fn read_value(db: &Database, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    let read_txn = db
        .begin_read()
        .map_err(|e| StoreError::backend(e.to_string()))?;
    let table = match read_txn.open_table(SHARD_TABLE) {
        Ok(table) => table,
        // A database without the table simply holds no shards.
        Err(TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(e) => return Err(StoreError::backend(e.to_string())),
    };
    let value = table
        .get(key)
        .map_err(|e| StoreError::backend(e.to_string()))?;
    Ok(value.map(|guard| guard.value().to_vec()))
}

fn contains_value(db: &Database, key: &str) -> Result<bool, StoreError> {
    read_value(db, key).map(|value| value.is_some())
}

impl ShardStore for RedbShardStore {
    fn contains(&self, key: &ShardKey) -> Result<bool, StoreError> {
        contains_value(&self.db, &key.as_storage_key())
    }

    fn fetch(&self, key: &ShardKey) -> Result<Option<Vec<u8>>, StoreError> {
        read_value(&self.db, &key.as_storage_key())
    }
}

#[async_trait]
impl AsyncShardStore for RedbShardStore {
    async fn contains_async(&self, key: &ShardKey) -> Result<bool, StoreError> {
        let db = Arc::clone(&self.db);
        let key = key.as_storage_key();
        tokio::task::spawn_blocking(move || contains_value(&db, &key))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?
    }

    async fn fetch_async(&self, key: &ShardKey) -> Result<Option<Vec<u8>>, StoreError> {
        let db = Arc::clone(&self.db);
        let key = key.as_storage_key();
        tokio::task::spawn_blocking(move || read_value(&db, &key))
            .await
            .map_err(|e| StoreError::backend(e.to_string()))?
    }
}
