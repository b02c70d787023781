#![allow(dead_code)]

use std::collections::BTreeMap;

use uapatterns::{CandidateHash, InMemoryShardStore, ShardKey, FALLBACK_HASH};

/// md5 hex of `text`, as the database build keys a pattern prefix.
pub fn hash_of(text: &str) -> String {
    CandidateHash::digest(text.as_bytes())
        .expect("md5 hex is a valid hash")
        .as_str()
        .to_string()
}

/// Builds shard contents record by record, grouped by shard key.
#[derive(Default)]
pub struct Fixture {
    shards: BTreeMap<String, (ShardKey, Vec<String>)>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record keyed by md5(`prefix`).
    pub fn record(
        self,
        prefix: &str,
        specificity: i64,
        min_length: i64,
        substring: &str,
        marker: u32,
        pattern: &str,
    ) -> Self {
        let hash = hash_of(prefix);
        let line =
            format!("{hash}\t{specificity}\t{min_length}\t{substring}\t{marker}||{pattern}");
        self.raw_record(&hash, &line)
    }

    /// Add a record to the fallback bucket.
    pub fn fallback(self, specificity: i64, marker: u32, pattern: &str) -> Self {
        self.raw_record(
            FALLBACK_HASH,
            &format!("{FALLBACK_HASH}\t{specificity}\t0\t\t{marker}||{pattern}"),
        )
    }

    /// Add an arbitrary line to the shard addressed by `hash`.
    pub fn raw_record(mut self, hash: &str, line: &str) -> Self {
        let key = ShardKey::for_hash(&CandidateHash::new(hash).expect("valid hash"));
        self.shards
            .entry(key.as_storage_key())
            .or_insert_with(|| (key, Vec::new()))
            .1
            .push(line.to_string());
        self
    }

    /// Shard contents as `(storage key, value bytes)` pairs.
    pub fn entries(&self) -> Vec<(String, Vec<u8>)> {
        self.shards
            .iter()
            .map(|(name, (_, lines))| (name.clone(), lines.join("\n").into_bytes()))
            .collect()
    }

    pub fn build(self) -> InMemoryShardStore {
        let store = InMemoryShardStore::new();
        for (key, lines) in self.shards.into_values() {
            store.insert_lines(&key, lines).expect("seed shard");
        }
        store
    }
}

/// A small database resembling real browscap rows.
pub fn browser_fixture() -> Fixture {
    Fixture::new()
        .record("Mozilla/5", 12, 10, "TestAgent", 3, "Mozilla/5.0*TestAgent*")
        .record("Mozilla/5", 25, 30, "Firefox", 7, "Mozilla/5.0 (*Linux*) Gecko/* Firefox/*")
        .record("Mozilla/5", 25, 30, "Firefox", 11, "Mozilla/5.0 (*Windows*) Gecko/* Firefox/*")
        .record("Mozilla/", 8, 8, "", 20, "Mozilla/*")
        .record("Opera/9", 14, 10, "Presto", 4, "Opera/9.* (*) Presto/*")
        .record("Opera", 6, 5, "", 8, "Opera*")
        .record("Googlebot", 18, 12, "", 2, "Googlebot/2.1*")
        .fallback(0, 1, "*")
}
