use keys::KeyError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum number of entries per output unit.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Configuration for a [`PatternLookup`](crate::PatternLookup).
///
/// `batch_size` is a contract with the downstream matcher (for example an
/// alternation-size limit) and bounds every non-terminal output unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupConfig {
    /// Maximum entries per emitted unit. Must be greater than zero.
    #[serde(default = "LookupConfig::default_batch_size")]
    pub batch_size: usize,
}

impl LookupConfig {
    pub(crate) fn default_batch_size() -> usize {
        DEFAULT_BATCH_SIZE
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> Result<(), LookupError> {
        if self.batch_size == 0 {
            return Err(LookupError::InvalidConfig(
                "batch_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            batch_size: Self::default_batch_size(),
        }
    }
}

/// Counters describing one candidate collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupStats {
    /// Candidate hashes derived from the identifier, fallback included.
    pub candidates: usize,
    /// Distinct shards addressed by the candidates.
    pub shards_visited: usize,
    /// Shards skipped as missing, failed, or unusable.
    pub shards_skipped: usize,
    /// Records that passed every filter.
    pub records_kept: usize,
    /// Records skipped because they did not parse.
    pub records_malformed: usize,
    /// Distinct specificity groups holding at least one record.
    pub groups: usize,
}

/// Errors produced by the lookup layer.
///
/// Shard-level problems never surface here; they are logged and skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Invalid lookup configuration.
    #[error("invalid lookup config: {0}")]
    InvalidConfig(String),
    /// Candidate derivation failed.
    #[error("candidate key error: {0}")]
    Keys(#[from] KeyError),
}
