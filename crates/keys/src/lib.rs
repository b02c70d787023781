//! Candidate key layer for sharded pattern lookup.
//!
//! This crate turns a client identifier (typically a user-agent string) into
//! the keys a lookup needs: the ordered candidate hashes and the shards that
//! hold their records.
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence. The derivation is a durable
//! contract shared with whatever built the rule database, so the same bytes
//! produce the same candidates on any machine, forever.
//!
//! ## Flow
//!
//! ```text
//! identifier -> generate() -> CandidateSet -> shard_for() -> ShardKey
//! ```

mod error;
mod hash;
mod shard;

pub use crate::error::KeyError;
pub use crate::hash::{
    generate, CandidateHash, CandidateSet, FALLBACK_HASH, HASH_WIDTH, PREFIX_WINDOW,
};
pub use crate::shard::{shard_for, KeyNamespace, ShardId, ShardKey, SHARD_PREFIX_LEN};
