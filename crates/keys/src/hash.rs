//! Candidate hash derivation.
//!
//! The rule database is partitioned by MD5 digests of identifier prefixes, so
//! lookup must reproduce the builder's derivation byte for byte:
//!
//! ```text
//! window   = identifier[..32]                       (bytes)
//! literal  = leading run of window without . * ? \ or ASCII whitespace
//! hashes   = md5(literal[..n]), md5(literal[..n-1]), ..., md5(literal[..1]), md5("")
//! fallback = "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"
//! ```
//!
//! When no literal can be extracted the list collapses to `md5("")`. The
//! fallback hash is always appended last and addresses the catch-all shard.
//!
//! # Examples
//!
//! ```rust
//! use keys::{generate, CandidateHash};
//!
//! let set = generate(b"Mo").unwrap();
//! let hashes: Vec<&str> = set.iter().map(CandidateHash::as_str).collect();
//! assert_eq!(
//!     hashes,
//!     vec![
//!         "c08df9bb5fb44242a6291b1eee5d09ad", // md5("Mo")
//!         "69691c7bdcc3ce6d5d8a1361f22d04ac", // md5("M")
//!         "d41d8cd98f00b204e9800998ecf8427e", // md5("")
//!         "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz",
//!     ]
//! );
//! ```

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::KeyError;

/// Width in bytes of every candidate hash (lowercase hex MD5).
pub const HASH_WIDTH: usize = 32;

/// Number of leading identifier bytes considered when extracting the literal.
pub const PREFIX_WINDOW: usize = 32;

/// Hash of the catch-all bucket holding the default rules.
pub const FALLBACK_HASH: &str = "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz";

/// A fixed-width hash-prefix value addressing records in the rule database.
///
/// Valid values are exactly [`HASH_WIDTH`] bytes from `[0-9a-z]`, which covers
/// both hex digests and [`FALLBACK_HASH`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CandidateHash(String);

impl CandidateHash {
    /// Validate and wrap an already-derived hash string.
    pub fn new(value: impl Into<String>) -> Result<Self, KeyError> {
        let value = value.into();
        if value.len() != HASH_WIDTH {
            return Err(KeyError::InvalidHash {
                value,
                reason: "hash must be exactly 32 bytes",
            });
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        {
            return Err(KeyError::InvalidHash {
                value,
                reason: "hash must only contain [0-9a-z]",
            });
        }
        Ok(Self(value))
    }

    /// Hash of the catch-all bucket.
    pub fn fallback() -> Self {
        Self(FALLBACK_HASH.to_string())
    }

    /// Lowercase hex MD5 of `bytes`.
    pub fn digest(bytes: &[u8]) -> Result<Self, KeyError> {
        Self::new(hex::encode(Md5::digest(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_HASH
    }
}

impl fmt::Display for CandidateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CandidateHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CandidateHash {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CandidateHash {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CandidateHash> for String {
    fn from(value: CandidateHash) -> Self {
        value.0
    }
}

/// Ordered, duplicate-free set of candidate hashes for one identifier.
///
/// Iteration order is derivation order (longest literal first, fallback last);
/// membership checks are O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    ordered: Vec<CandidateHash>,
    members: HashSet<CandidateHash>,
}

impl CandidateSet {
    /// Build a set from hashes in priority order, keeping the first occurrence
    /// of each value.
    pub fn from_hashes<I>(hashes: I) -> Self
    where
        I: IntoIterator<Item = CandidateHash>,
    {
        let mut ordered = Vec::new();
        let mut members = HashSet::new();
        for hash in hashes {
            if members.insert(hash.clone()) {
                ordered.push(hash);
            }
        }
        Self { ordered, members }
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.members.contains(hash)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateHash> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a CandidateHash;
    type IntoIter = std::slice::Iter<'a, CandidateHash>;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered.iter()
    }
}

/// Derive the candidate hashes for `identifier`, fallback last.
///
/// Pure and deterministic: identical bytes always yield an identical set.
pub fn generate(identifier: &[u8]) -> Result<CandidateSet, KeyError> {
    let mut hashes = Vec::with_capacity(PREFIX_WINDOW + 2);
    if let Some(literal) = leading_literal(identifier) {
        for end in (1..=literal.len()).rev() {
            hashes.push(CandidateHash::digest(&literal[..end])?);
        }
    }
    // Rules that begin with a wildcard live under the empty-prefix hash.
    hashes.push(CandidateHash::digest(b"")?);
    hashes.push(CandidateHash::fallback());
    Ok(CandidateSet::from_hashes(hashes))
}

/// Leading literal run of the identifier window, if the window is well formed.
///
/// The remainder after the run may contain a line feed only as its final byte.
fn leading_literal(identifier: &[u8]) -> Option<&[u8]> {
    let window = &identifier[..identifier.len().min(PREFIX_WINDOW)];
    let run = window.iter().take_while(|b| !is_boundary(**b)).count();
    if run == 0 {
        return None;
    }
    let rest = &window[run..];
    match rest.iter().position(|&b| b == b'\n') {
        Some(pos) if pos + 1 != rest.len() => None,
        _ => Some(&window[..run]),
    }
}

fn is_boundary(byte: u8) -> bool {
    matches!(
        byte,
        b'.' | b'*' | b'?' | b'\\' | b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r'
    )
}
