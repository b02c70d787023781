//! # Pattern Store
//!
//! Read-only access to the sharded pattern database. The store is an
//! external collaborator: this crate fixes the contract a lookup relies on
//! and ships two backends.
//!
//! - [`ShardStore`] / [`AsyncShardStore`]: byte-level `contains` + `fetch`
//!   keyed by a typed [`keys::ShardKey`].
//! - [`read_shard`] / [`read_shard_async`]: classify one read into
//!   [`ShardFetch`] (missing, failed, unusable, or record lines).
//! - [`InMemoryShardStore`]: `HashMap`-backed, seeded by the caller.
//! - `RedbShardStore`: redb file produced by the database build (enabled via
//!   the `backend-redb` feature).
//!
//! ## Example
//!
//! ```
//! use keys::{CandidateHash, ShardKey};
//! use store::{read_shard, InMemoryShardStore, ShardFetch};
//!
//! let store = InMemoryShardStore::new();
//! let key = ShardKey::for_hash(&CandidateHash::fallback());
//! assert_eq!(read_shard(&store, &key), ShardFetch::Missing);
//!
//! store.insert_lines(&key, ["zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz\t0\t0\t\t1||*"]).unwrap();
//! assert!(matches!(read_shard(&store, &key), ShardFetch::Lines(lines) if lines.len() == 1));
//! ```

mod backend;
mod error;
mod shard;

#[cfg(feature = "backend-redb")]
pub use crate::backend::{RedbShardStore, SHARD_TABLE};
pub use crate::backend::{AsyncShardStore, InMemoryShardStore, ShardStore, StoreConfig};
pub use crate::error::StoreError;
pub use crate::shard::{decode_shard, read_shard, read_shard_async, ShardFetch};
