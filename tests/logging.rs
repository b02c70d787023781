//! Shard and record problems surface as structured tracing events.

mod common;

use std::sync::{Arc, Mutex};

use common::{hash_of, Fixture};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use uapatterns::{
    generate, CandidateHash, InMemoryShardStore, LookupConfig, PatternLookup, ShardKey,
    ShardStore, StoreError,
};

#[derive(Clone, Debug, PartialEq)]
struct Captured {
    level: Level,
    message: String,
    shard: Option<String>,
    error: Option<String>,
}

#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<Captured>>>,
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    shard: Option<String>,
    error: Option<String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "shard" => self.shard = Some(format!("{value:?}")),
            "error" => self.error = Some(format!("{value:?}")),
            _ => {}
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            message: visitor.message,
            shard: visitor.shard,
            error: visitor.error,
        });
    }
}

fn capture<F: FnOnce()>(f: F) -> Vec<Captured> {
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.events);
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

#[test]
fn missing_shards_log_at_debug() {
    let lookup = PatternLookup::new(Arc::new(Fixture::new().build()), LookupConfig::default())
        .unwrap();
    let events = capture(|| {
        let _ = lookup.candidates("Opera/9.80").unwrap().count();
    });

    assert!(!events.is_empty());
    assert!(events
        .iter()
        .all(|e| e.level == Level::DEBUG && e.message == "shard_not_found"));
    let fallback = ShardKey::for_hash(&CandidateHash::fallback()).to_string();
    assert!(events.iter().any(|e| e.shard.as_deref() == Some(fallback.as_str())));
}

#[test]
fn unusable_shard_logs_empty_or_invalid() {
    let store = Fixture::new().build();
    let key = ShardKey::for_hash(&CandidateHash::digest(b"Opera").unwrap());
    store.insert_raw(&key, vec![0xff]).unwrap();
    let lookup = PatternLookup::new(Arc::new(store), LookupConfig::default()).unwrap();

    let events = capture(|| {
        let _ = lookup.candidates("Opera/9.80").unwrap().count();
    });
    assert!(events.iter().any(|e| e.message == "shard_empty_or_invalid"
        && e.shard.as_deref() == Some(key.to_string().as_str())));
}

#[test]
fn malformed_record_logs_a_warning() {
    let hash = hash_of("Opera");
    let fixture = Fixture::new().raw_record(&hash, &format!("{hash}\tbroken"));
    let lookup = PatternLookup::new(Arc::new(fixture.build()), LookupConfig::default()).unwrap();

    let events = capture(|| {
        let _ = lookup.candidates("Opera/9.80").unwrap().count();
    });
    let warnings: Vec<_> = events.iter().filter(|e| e.level == Level::WARN).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "malformed_pattern_record");
}

/// Fails every fetch for one shard key.
struct FailingShardStore {
    inner: InMemoryShardStore,
    failing: ShardKey,
}

impl ShardStore for FailingShardStore {
    fn contains(&self, key: &ShardKey) -> Result<bool, StoreError> {
        if key == &self.failing {
            return Ok(true);
        }
        self.inner.contains(key)
    }

    fn fetch(&self, key: &ShardKey) -> Result<Option<Vec<u8>>, StoreError> {
        if key == &self.failing {
            return Err(StoreError::backend("disk offline"));
        }
        self.inner.fetch(key)
    }
}

#[test]
fn fetch_failure_logs_shard_and_error() {
    let failing = ShardKey::for_hash(&CandidateHash::fallback());
    let store = FailingShardStore {
        inner: Fixture::new().build(),
        failing: failing.clone(),
    };
    let lookup = PatternLookup::new(Arc::new(store), LookupConfig::default()).unwrap();

    let events = capture(|| {
        let _ = lookup.candidates("Opera/9.80").unwrap().count();
    });
    let failures: Vec<_> = events
        .iter()
        .filter(|e| e.message == "shard_fetch_failed")
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].level, Level::DEBUG);
    assert_eq!(failures[0].shard.as_deref(), Some(failing.to_string().as_str()));
    assert!(failures[0]
        .error
        .as_deref()
        .is_some_and(|err| err.contains("disk offline")));
}

#[test]
fn each_skip_outcome_logs_only_its_own_event() {
    let failing = ShardKey::for_hash(&CandidateHash::fallback());
    let unusable = ShardKey::for_hash(&CandidateHash::digest(b"Opera").unwrap());
    let inner = Fixture::new().build();
    inner.insert_raw(&unusable, Vec::new()).unwrap();
    let store = FailingShardStore {
        inner,
        failing: failing.clone(),
    };
    let lookup = PatternLookup::new(Arc::new(store), LookupConfig::default()).unwrap();

    let events = capture(|| {
        let _ = lookup.candidates("Opera/9.80").unwrap().count();
    });

    let mut shards: Vec<String> = generate(b"Opera/9.80")
        .unwrap()
        .iter()
        .map(|hash| ShardKey::for_hash(hash).to_string())
        .collect();
    shards.sort();
    shards.dedup();
    assert_eq!(events.len(), shards.len());

    for shard in &shards {
        let for_shard: Vec<_> = events
            .iter()
            .filter(|e| e.shard.as_deref() == Some(shard.as_str()))
            .collect();
        assert_eq!(for_shard.len(), 1, "{shard}");
        let expected = if *shard == failing.to_string() {
            "shard_fetch_failed"
        } else if *shard == unusable.to_string() {
            "shard_empty_or_invalid"
        } else {
            "shard_not_found"
        };
        assert_eq!(for_shard[0].message, expected, "{shard}");
        assert_eq!(for_shard[0].level, Level::DEBUG);
    }
}
