use std::collections::{btree_map, BTreeMap};

/// Buckets in descending specificity order.
pub(crate) type DescendingGroups = std::iter::Rev<btree_map::IntoIter<i64, Vec<String>>>;

/// Buckets surviving payloads by specificity across shards.
///
/// Buckets appear on first contribution. Order inside a bucket is whatever
/// arrival order produced; the emitter re-sorts before output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAggregator {
    groups: BTreeMap<i64, Vec<String>>,
}

impl GroupAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `(specificity, payload)` pairs to their buckets.
    pub fn merge<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (i64, String)>,
    {
        for (specificity, payload) in entries {
            self.groups.entry(specificity).or_default().push(payload);
        }
    }

    /// Number of distinct specificity buckets.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total payloads across all buckets.
    pub fn entry_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn get(&self, specificity: i64) -> Option<&[String]> {
        self.groups.get(&specificity).map(Vec::as_slice)
    }

    pub(crate) fn into_descending(self) -> DescendingGroups {
        self.groups.into_iter().rev()
    }
}
