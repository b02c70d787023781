// Metrics hooks for the `lookup` crate.
//
// Callers install a global `LookupMetrics` implementation via
// [`set_lookup_metrics`]; every completed candidate collection then reports
// its latency and counters. This keeps instrumentation decoupled from any
// specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::LookupStats;

/// Metrics observer for lookups.
pub trait LookupMetrics: Send + Sync {
    /// Record one finished collection phase.
    ///
    /// `latency` spans candidate derivation through the last merged shard;
    /// lazy emission afterwards is not included.
    fn record_lookup(&self, latency: Duration, stats: &LookupStats);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn LookupMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn LookupMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn LookupMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global lookup metrics recorder.
pub fn set_lookup_metrics(recorder: Option<Arc<dyn LookupMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
