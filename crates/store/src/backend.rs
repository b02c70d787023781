use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use keys::ShardKey;

use crate::StoreError;

/// Read-only access to serialized shard record lists.
///
/// Values are opaque bytes here; [`read_shard`](crate::read_shard) decodes
/// them into record lines and classifies the outcome.
pub trait ShardStore: Send + Sync {
    /// Whether a value exists for `key`.
    fn contains(&self, key: &ShardKey) -> Result<bool, StoreError>;
    /// Fetch the raw value for `key`. `Ok(None)` means the fetch found nothing.
    fn fetch(&self, key: &ShardKey) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Async counterpart of [`ShardStore`] for backends that suspend on I/O.
///
/// Timeout and retry policy belong to the implementation.
#[async_trait]
pub trait AsyncShardStore: Send + Sync {
    async fn contains_async(&self, key: &ShardKey) -> Result<bool, StoreError>;
    async fn fetch_async(&self, key: &ShardKey) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use store::StoreConfig;
///
/// // In-memory (for testing)
/// let config = StoreConfig::in_memory();
///
/// // Redb file produced by the database build
/// let config = StoreConfig::redb("/data/patterns.redb");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StoreConfig {
    /// Open an existing redb file. Requires the `backend-redb` feature.
    Redb { path: PathBuf },
    /// Empty in-memory store, seeded by the caller.
    #[default]
    InMemory,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub fn redb<P: Into<PathBuf>>(path: P) -> Self {
        StoreConfig::Redb { path: path.into() }
    }

    /// Build the configured backend.
    pub fn build(&self) -> Result<Box<dyn ShardStore>, StoreError> {
        match self {
            StoreConfig::InMemory => Ok(Box::new(InMemoryShardStore::new())),
            StoreConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Box::new(RedbShardStore::open(path)?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(StoreError::backend("redb backend disabled at compile time"))
                }
            }
        }
    }
}

/// An in-memory store using a `RwLock` around a `HashMap`.
///
/// Keys are the textual form of [`ShardKey`]. Seeding goes through the
/// inherent `insert_*` methods; the store contracts stay read-only.
pub struct InMemoryShardStore {
    shards: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryShardStore {
    pub fn new() -> Self {
        Self {
            shards: RwLock::new(HashMap::new()),
        }
    }

    /// Store `lines` for `key`, one record per line.
    pub fn insert_lines<I, L>(&self, key: &ShardKey, lines: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut value = String::new();
        for line in lines {
            if !value.is_empty() {
                value.push('\n');
            }
            value.push_str(line.as_ref());
        }
        self.insert_raw(key, value.into_bytes())
    }

    /// Store an arbitrary value for `key`.
    pub fn insert_raw(&self, key: &ShardKey, value: Vec<u8>) -> Result<(), StoreError> {
        self.shards
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .insert(key.as_storage_key(), value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.shards
            .read()
            .map(|guard| guard.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryShardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardStore for InMemoryShardStore {
    fn contains(&self, key: &ShardKey) -> Result<bool, StoreError> {
        let guard = self
            .shards
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.contains_key(&key.as_storage_key()))
    }

    fn fetch(&self, key: &ShardKey) -> Result<Option<Vec<u8>>, StoreError> {
        let guard = self
            .shards
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(&key.as_storage_key()).cloned())
    }
}

#[async_trait]
impl AsyncShardStore for InMemoryShardStore {
    async fn contains_async(&self, key: &ShardKey) -> Result<bool, StoreError> {
        self.contains(key)
    }

    async fn fetch_async(&self, key: &ShardKey) -> Result<Option<Vec<u8>>, StoreError> {
        self.fetch(key)
    }
}

/// Redb-backed store for databases produced by the pattern build.
#[cfg(feature = "backend-redb")]
pub mod redb;

#[cfg(feature = "backend-redb")]
pub use self::redb::{RedbShardStore, SHARD_TABLE};
