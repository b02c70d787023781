//! Shard value decoding and outcome classification.

use keys::ShardKey;

use crate::{AsyncShardStore, ShardStore, StoreError};

/// Outcome of reading one shard.
///
/// Only [`ShardFetch::Lines`] carries records; every other outcome means the
/// shard is skipped and the lookup continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShardFetch {
    /// The store holds no value for the key.
    Missing,
    /// The store failed to deliver a value it claimed to hold.
    Failed(StoreError),
    /// A value exists but carries no usable records.
    Unusable { reason: &'static str },
    /// Decoded record lines, in stored order.
    Lines(Vec<String>),
}

impl ShardFetch {
    fn from_fetch(result: Result<Option<Vec<u8>>, StoreError>) -> Self {
        match result {
            Err(err) => ShardFetch::Failed(err),
            Ok(None) => ShardFetch::Failed(StoreError::unavailable("fetch returned no value")),
            Ok(Some(value)) => decode_shard(value),
        }
    }
}

/// Decode a raw shard value into record lines.
///
/// Values are UTF-8 with one record per line (`\n` or `\r\n`); blank lines
/// are not records.
pub fn decode_shard(value: Vec<u8>) -> ShardFetch {
    let text = match String::from_utf8(value) {
        Ok(text) => text,
        Err(_) => {
            return ShardFetch::Unusable {
                reason: "value is not valid UTF-8",
            }
        }
    };
    let lines: Vec<String> = text
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();
    if lines.is_empty() {
        ShardFetch::Unusable {
            reason: "shard holds no records",
        }
    } else {
        ShardFetch::Lines(lines)
    }
}

/// Check for, fetch, and decode the shard stored under `key`.
pub fn read_shard<S: ShardStore + ?Sized>(store: &S, key: &ShardKey) -> ShardFetch {
    match store.contains(key) {
        Ok(true) => ShardFetch::from_fetch(store.fetch(key)),
        Ok(false) => ShardFetch::Missing,
        Err(err) => ShardFetch::Failed(err),
    }
}

/// Async variant of [`read_shard`].
pub async fn read_shard_async<S: AsyncShardStore + ?Sized>(
    store: &S,
    key: &ShardKey,
) -> ShardFetch {
    match store.contains_async(key).await {
        Ok(true) => ShardFetch::from_fetch(store.fetch_async(key).await),
        Ok(false) => ShardFetch::Missing,
        Err(err) => ShardFetch::Failed(err),
    }
}
