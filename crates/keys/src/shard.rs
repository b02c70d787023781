//! Shard addressing.
//!
//! Every candidate hash maps onto the shard named by its first two
//! characters. The mapping is many-to-one: all hex hashes spread over 256
//! shards and the fallback hash lives alone in shard `zz`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;
use crate::hash::CandidateHash;

/// Number of leading hash characters that name a shard.
pub const SHARD_PREFIX_LEN: usize = 2;

/// Partition identifier derived purely from a [`CandidateHash`].
///
/// Valid ids are exactly [`SHARD_PREFIX_LEN`] bytes from `[0-9a-z]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShardId(String);

impl ShardId {
    pub fn new(value: impl Into<String>) -> Result<Self, KeyError> {
        let value = value.into();
        if value.len() != SHARD_PREFIX_LEN {
            return Err(KeyError::InvalidShard {
                value,
                reason: "shard id must be exactly 2 bytes",
            });
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        {
            return Err(KeyError::InvalidShard {
                value,
                reason: "shard id must only contain [0-9a-z]",
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShardId {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShardId> for String {
    fn from(value: ShardId) -> Self {
        value.0
    }
}

/// Map a hash onto its shard. Same hash, same shard.
pub fn shard_for(hash: &CandidateHash) -> ShardId {
    ShardId(hash.as_str()[..SHARD_PREFIX_LEN].to_string())
}

/// Namespace tag for keys in the shard store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyNamespace {
    /// Serialized pattern record lists.
    Patterns,
}

impl KeyNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyNamespace::Patterns => "patterns",
        }
    }
}

/// Typed store key: namespace plus shard.
///
/// The textual form is `"<namespace>.<shard>"`, e.g. `patterns.d4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardKey {
    namespace: KeyNamespace,
    shard: ShardId,
}

impl ShardKey {
    pub fn new(namespace: KeyNamespace, shard: ShardId) -> Self {
        Self { namespace, shard }
    }

    /// Key of the pattern list for `shard`.
    pub fn patterns(shard: ShardId) -> Self {
        Self::new(KeyNamespace::Patterns, shard)
    }

    /// Key of the pattern list holding `hash`.
    pub fn for_hash(hash: &CandidateHash) -> Self {
        Self::patterns(shard_for(hash))
    }

    pub fn namespace(&self) -> KeyNamespace {
        self.namespace
    }

    pub fn shard(&self) -> &ShardId {
        &self.shard
    }

    /// String form used by string-keyed backends.
    pub fn as_storage_key(&self) -> String {
        format!("{}.{}", self.namespace.as_str(), self.shard)
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace.as_str(), self.shard)
    }
}
