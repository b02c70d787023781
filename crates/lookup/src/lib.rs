//! # Pattern Lookup (`lookup`)
//!
//! ## Purpose
//!
//! `lookup` produces the minimal, ordered list of candidate patterns a
//! downstream matcher must try against an identifier. It sits on top of the
//! key layer (`keys`) and the shard store contract (`store`):
//!
//! ```text
//! identifier -> candidate hashes -> distinct shards -> fetch
//!            -> RecordFilter -> GroupAggregator -> CandidateBatches
//! ```
//!
//! The matcher tests each unit in order and stops at the first structural
//! match. The trailing empty string means "no further candidates; fall back
//! to the default".
//!
//! ## Core Types
//!
//! - [`PatternLookup`]: wires a store and a [`LookupConfig`] together.
//! - [`RecordFilter`]: cheap rejection of records that cannot match.
//! - [`GroupAggregator`]: specificity buckets accumulated across shards.
//! - [`CandidateBatches`]: lazy, specificity-ordered, size-bounded units.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use keys::{CandidateHash, ShardKey, FALLBACK_HASH};
//! use lookup::{LookupConfig, PatternLookup};
//! use store::InMemoryShardStore;
//!
//! let store = InMemoryShardStore::new();
//! store
//!     .insert_lines(
//!         &ShardKey::for_hash(&CandidateHash::fallback()),
//!         [format!("{FALLBACK_HASH}\t0\t0\t\t1||*")],
//!     )
//!     .unwrap();
//!
//! let lookup = PatternLookup::new(Arc::new(store), LookupConfig::default()).unwrap();
//! let units: Vec<String> = lookup.candidates("Anything/1.0").unwrap().collect();
//! assert_eq!(units, vec!["*".to_string(), String::new()]);
//! ```
//!
//! ## Observability
//!
//! Skipped shards are reported as `debug` events (`shard_not_found`,
//! `shard_fetch_failed`, `shard_empty_or_invalid`) and malformed records as
//! `warn` events (`malformed_pattern_record`). Install a [`LookupMetrics`]
//! implementation via [`set_lookup_metrics`] to record per-lookup counters.

pub mod emit;
pub mod engine;
pub mod group;
pub mod metrics;
pub mod record;
pub mod types;

pub use crate::emit::{natural_cmp, strip_marker, CandidateBatches, ENTRY_SEPARATOR};
pub use crate::engine::PatternLookup;
pub use crate::group::GroupAggregator;
pub use crate::metrics::{set_lookup_metrics, LookupMetrics};
pub use crate::record::{FilteredShard, PatternRecord, RecordError, RecordFilter};
pub use crate::types::{LookupConfig, LookupError, LookupStats, DEFAULT_BATCH_SIZE};
