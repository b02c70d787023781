//! Workspace umbrella crate for the sharded user-agent pattern lookup.
//!
//! This crate stitches the key layer, the shard store and the lookup engine
//! together so callers can go from a YAML file to an ordered candidate list
//! with a single entry point.

pub mod config;

pub use config::{
    ConfigLoadError, LookupYamlConfig, StoreBackendKind, StoreYamlConfig, UaPatternsConfig,
};
pub use keys::{
    generate, shard_for, CandidateHash, CandidateSet, KeyError, KeyNamespace, ShardId, ShardKey,
    FALLBACK_HASH, HASH_WIDTH, PREFIX_WINDOW, SHARD_PREFIX_LEN,
};
pub use lookup::{
    natural_cmp, set_lookup_metrics, strip_marker, CandidateBatches, LookupConfig, LookupError,
    LookupMetrics, LookupStats, PatternLookup, DEFAULT_BATCH_SIZE,
};
#[cfg(feature = "embedded")]
pub use store::{RedbShardStore, SHARD_TABLE};
pub use store::{
    read_shard, read_shard_async, AsyncShardStore, InMemoryShardStore, ShardFetch, ShardStore,
    StoreConfig, StoreError,
};

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

/// Errors raised while wiring a lookup from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("configuration failure: {0}")]
    Config(#[from] ConfigLoadError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("lookup failure: {0}")]
    Lookup(#[from] LookupError),
}

/// Build a lookup over the backend selected by `config`.
pub fn open_lookup(config: &UaPatternsConfig) -> Result<PatternLookup<dyn ShardStore>, SetupError> {
    config.validate()?;
    let store_config = config.to_store_config()?;
    let store: Arc<dyn ShardStore> = Arc::from(store_config.build()?);
    let lookup = PatternLookup::new(store, config.to_lookup_config())?;
    info!(
        backend = ?config.store.backend,
        batch_size = lookup.config().batch_size,
        "pattern_lookup_opened"
    );
    Ok(lookup)
}

/// [`open_lookup`] for a YAML file on disk.
pub fn open_lookup_from_file<P: AsRef<Path>>(
    path: P,
) -> Result<PatternLookup<dyn ShardStore>, SetupError> {
    let config = UaPatternsConfig::from_file(path)?;
    open_lookup(&config)
}
