use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use keys::{generate, shard_for, CandidateSet, ShardKey};
use store::{read_shard, read_shard_async, AsyncShardStore, ShardFetch, ShardStore};
use tracing::debug;

use crate::emit::CandidateBatches;
use crate::group::GroupAggregator;
use crate::metrics::metrics_recorder;
use crate::record::RecordFilter;
use crate::types::{LookupConfig, LookupError, LookupStats};


/// Retrieves the ordered candidate patterns for an identifier.
///
/// Generic over the store so callers can hold a concrete backend or a
/// `dyn ShardStore` / `dyn AsyncShardStore` trait object.
pub struct PatternLookup<S: ?Sized> {
    store: Arc<S>,
    config: LookupConfig,
}

impl<S: ?Sized> PatternLookup<S> {
    /// Construct a lookup over `store`, validating `config`.
    pub fn new(store: Arc<S>, config: LookupConfig) -> Result<Self, LookupError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S: ShardStore + ?Sized> PatternLookup<S> {
    /// Collect candidates for `identifier`, reading shards one after another.
    ///
    /// Shard problems are logged and skipped; the only errors are fatal
    /// candidate derivation failures.
    pub fn candidates(
        &self,
        identifier: impl AsRef<[u8]>,
    ) -> Result<CandidateBatches, LookupError> {
        let identifier = identifier.as_ref();
        let started = Instant::now();
        let plan = LookupPlan::new(identifier)?;
        let filter = RecordFilter::new(&plan.candidates, identifier);
        let mut collector = Collector::new(&plan);

        for key in &plan.shards {
            collector.absorb(&filter, key, read_shard(self.store.as_ref(), key));
        }

        Ok(collector.finish(self.config.batch_size, started))
    }
}

impl<S: AsyncShardStore + ?Sized> PatternLookup<S> {
    /// Collect candidates for `identifier`, reading all shards concurrently.
    ///
    /// Contributions are merged in first-reference order once every read has
    /// completed, so the output matches [`PatternLookup::candidates`].
    pub async fn candidates_async(
        &self,
        identifier: impl AsRef<[u8]>,
    ) -> Result<CandidateBatches, LookupError> {
        let identifier = identifier.as_ref();
        let started = Instant::now();
        let plan = LookupPlan::new(identifier)?;

        let store = self.store.as_ref();
        let fetched = join_all(plan.shards.iter().map(|key| read_shard_async(store, key))).await;

        let filter = RecordFilter::new(&plan.candidates, identifier);
        let mut collector = Collector::new(&plan);
        for (key, shard) in plan.shards.iter().zip(fetched) {
            collector.absorb(&filter, key, shard);
        }

        Ok(collector.finish(self.config.batch_size, started))
    }
}

/// Candidate hashes plus the distinct shards they address.
struct LookupPlan {
    candidates: CandidateSet,
    shards: Vec<ShardKey>,
}

impl LookupPlan {
    fn new(identifier: &[u8]) -> Result<Self, LookupError> {
        let candidates = generate(identifier)?;
        // A shard is claimed by its first referencing hash, fetched or not.
        let mut seen = HashSet::new();
        let shards = candidates
            .iter()
            .map(shard_for)
            .filter(|shard| seen.insert(shard.clone()))
            .map(ShardKey::patterns)
            .collect();
        Ok(Self { candidates, shards })
    }
}

struct Collector {
    groups: GroupAggregator,
    stats: LookupStats,
}

impl Collector {
    fn new(plan: &LookupPlan) -> Self {
        Self {
            groups: GroupAggregator::new(),
            stats: LookupStats {
                candidates: plan.candidates.len(),
                shards_visited: plan.shards.len(),
                ..LookupStats::default()
            },
        }
    }

    fn absorb(&mut self, filter: &RecordFilter<'_>, key: &ShardKey, fetched: ShardFetch) {
        match fetched {
            ShardFetch::Lines(lines) => {
                let filtered = filter.filter(key, &lines);
                self.stats.records_kept += filtered.entries.len();
                self.stats.records_malformed += filtered.malformed;
                self.groups.merge(filtered.entries);
            }
            ShardFetch::Missing => {
                self.stats.shards_skipped += 1;
                debug!(shard = %key, "shard_not_found");
            }
            ShardFetch::Failed(err) => {
                self.stats.shards_skipped += 1;
                debug!(shard = %key, error = %err, "shard_fetch_failed");
            }
            ShardFetch::Unusable { reason } => {
                self.stats.shards_skipped += 1;
                debug!(shard = %key, reason, "shard_empty_or_invalid");
            }
        }
    }

    fn finish(mut self, batch_size: usize, started: Instant) -> CandidateBatches {
        self.stats.groups = self.groups.len();
        if let Some(recorder) = metrics_recorder() {
            recorder.record_lookup(started.elapsed(), &self.stats);
        }
        CandidateBatches::new(self.groups, batch_size, self.stats)
    }
}
