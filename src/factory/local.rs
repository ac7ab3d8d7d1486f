//! In-process metrics backend.
//!
//! [`LocalFactory`] keeps every series in memory and exposes a point-in-time
//! [`Snapshot`]: counter values plus percentile gauges derived from each
//! timer. It is meant for tests, debugging endpoints and embedding, not for
//! export.
//!
//! # Lazy gauges
//!
//! A timer contributes gauges (`name.P50`, `name.P99`, ...) only once it has
//! received at least one sample. A registered-but-empty timer is absent from
//! [`Snapshot::gauges`], which lets callers tell "never happened" apart from
//! "happened and measured zero". Counters are always present, starting at 0.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use metrics::{Counter, Histogram, HistogramFn};
use metrics_util::storage::Summary;
use serde::Serialize;
use tracing::trace;

use super::MetricsFactory;
use crate::telemetry;

/// Configuration for [`LocalFactory`].
///
/// ```rust
/// # use spanstore_metrics::LocalConfig;
/// let config = LocalConfig::new().quantiles([("P50", 0.5), ("P99", 0.99)]);
/// assert_eq!(config.quantiles.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Gauge label and quantile in `[0, 1]` derived from every timer.
    /// Default: P50, P75, P90, P95, P99, P999.
    pub quantiles: Vec<(String, f64)>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self::new().quantiles([
            ("P50", 0.5),
            ("P75", 0.75),
            ("P90", 0.9),
            ("P95", 0.95),
            ("P99", 0.99),
            ("P999", 0.999),
        ])
    }
}

impl LocalConfig {
    /// Create a config with no quantiles; add some with [`quantiles`](Self::quantiles).
    pub fn new() -> Self {
        Self {
            quantiles: Vec::new(),
        }
    }

    /// Replace the quantile set.
    pub fn quantiles<L: Into<String>>(
        mut self,
        quantiles: impl IntoIterator<Item = (L, f64)>,
    ) -> Self {
        self.quantiles = quantiles
            .into_iter()
            .map(|(label, q)| (label.into(), q.clamp(0.0, 1.0)))
            .collect();
        self
    }
}

/// Point-in-time view of a [`LocalFactory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Every counter by name, including those still at zero.
    pub counters: BTreeMap<String, u64>,
    /// `timer.label` gauges for timers with at least one sample.
    pub gauges: BTreeMap<String, f64>,
    /// Sample count per non-empty timer.
    pub samples: BTreeMap<String, u64>,
}

impl Snapshot {
    /// Counter value, 0 if the counter was never created.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.gauges.get(name).copied()
    }

    /// Number of samples a timer has received.
    pub fn sample_count(&self, name: &str) -> u64 {
        self.samples.get(name).copied().unwrap_or(0)
    }
}

/// Timer storage: a DDSketch summary behind a mutex.
struct LocalTimer {
    summary: Mutex<Summary>,
}

impl LocalTimer {
    fn new() -> Self {
        Self {
            summary: Mutex::new(Summary::with_defaults()),
        }
    }

    fn reset(&self) {
        *self.summary.lock().unwrap_or_else(PoisonError::into_inner) = Summary::with_defaults();
    }
}

impl HistogramFn for LocalTimer {
    fn record(&self, value: f64) {
        self.summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add(value);
    }
}

#[derive(Default)]
struct Registry {
    config: LocalConfig,
    counters: RwLock<BTreeMap<String, Arc<AtomicU64>>>,
    timers: RwLock<BTreeMap<String, Arc<LocalTimer>>>,
}

/// In-memory [`MetricsFactory`] with snapshot support.
///
/// Cloning is cheap and clones share the same series.
#[derive(Clone, Default)]
pub struct LocalFactory {
    registry: Arc<Registry>,
}

impl LocalFactory {
    /// Create a factory with the default quantile set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LocalConfig) -> Self {
        Self {
            registry: Arc::new(Registry {
                config,
                ..Registry::default()
            }),
        }
    }

    /// Capture current counter values and timer percentiles.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();

        let counters = self
            .registry
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for (name, value) in counters.iter() {
            snapshot
                .counters
                .insert(name.clone(), value.load(Ordering::Acquire));
        }
        drop(counters);

        let timers = self
            .registry
            .timers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for (name, timer) in timers.iter() {
            let summary = timer.summary.lock().unwrap_or_else(PoisonError::into_inner);
            if summary.is_empty() {
                continue;
            }
            snapshot
                .samples
                .insert(name.clone(), summary.count() as u64);
            for (label, q) in &self.registry.config.quantiles {
                if let Some(value) = summary.quantile(*q) {
                    snapshot
                        .gauges
                        .insert(telemetry::metric_name(name, label), value);
                }
            }
        }

        snapshot
    }

    /// Reset every series to its initial state.
    ///
    /// Series stay registered, so handles already given out keep working.
    pub fn clear(&self) {
        let counters = self
            .registry
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for value in counters.values() {
            value.store(0, Ordering::Release);
        }
        let timers = self
            .registry
            .timers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for timer in timers.values() {
            timer.reset();
        }
    }
}

impl MetricsFactory for LocalFactory {
    fn counter(&self, name: &str) -> Counter {
        Counter::from_arc(get_or_create(&self.registry.counters, name, || {
            AtomicU64::new(0)
        }))
    }

    fn timer(&self, name: &str) -> Histogram {
        Histogram::from_arc(get_or_create(&self.registry.timers, name, LocalTimer::new))
    }
}

impl std::fmt::Debug for LocalFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFactory")
            .field("config", &self.registry.config)
            .finish_non_exhaustive()
    }
}

/// Look up `name`, creating the series on first use.
///
/// Double-checked: concurrent first calls for one name yield the same series.
fn get_or_create<T>(
    series: &RwLock<BTreeMap<String, Arc<T>>>,
    name: &str,
    make: impl FnOnce() -> T,
) -> Arc<T> {
    if let Some(existing) = series
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
    {
        return Arc::clone(existing);
    }

    let mut series = series.write().unwrap_or_else(PoisonError::into_inner);
    let entry = series.entry(name.to_owned()).or_insert_with(|| {
        trace!(metric = name, "creating local series");
        Arc::new(make())
    });
    Arc::clone(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_accumulate() {
        let factory = LocalFactory::new();
        let counter = factory.counter("calls");
        assert_eq!(factory.snapshot().counter("calls"), 0);
        assert!(factory.snapshot().counters.contains_key("calls"));

        counter.increment(3);
        assert_eq!(factory.snapshot().counter("calls"), 3);
    }

    #[test]
    fn same_name_shares_series() {
        let factory = LocalFactory::new();
        factory.counter("calls").increment(1);
        factory.counter("calls").increment(1);
        assert_eq!(factory.snapshot().counter("calls"), 2);
    }

    #[test]
    fn empty_timer_has_no_gauges() {
        let factory = LocalFactory::new();
        let _timer = factory.timer("latency");
        let snapshot = factory.snapshot();
        assert!(snapshot.gauge("latency.P50").is_none());
        assert_eq!(snapshot.sample_count("latency"), 0);
    }

    #[test]
    fn timer_gauges_follow_samples() {
        let factory = LocalFactory::new();
        let timer = factory.timer("size");
        timer.record(4.0);

        let snapshot = factory.snapshot();
        let p50 = snapshot.gauge("size.P50").unwrap();
        assert!((p50 - 4.0).abs() < 0.01, "P50 was {p50}");
        for label in ["P75", "P90", "P95", "P99", "P999"] {
            assert!(snapshot.gauges.contains_key(&format!("size.{label}")));
        }
        assert_eq!(snapshot.sample_count("size"), 1);
    }

    #[test]
    fn custom_quantiles() {
        let factory = LocalFactory::with_config(LocalConfig::new().quantiles([("median", 0.5)]));
        factory.timer("t").record(1.0);
        let snapshot = factory.snapshot();
        assert!(snapshot.gauges.contains_key("t.median"));
        assert!(!snapshot.gauges.contains_key("t.P50"));
    }

    #[test]
    fn clear_resets_but_keeps_handles() {
        let factory = LocalFactory::new();
        let counter = factory.counter("c");
        let timer = factory.timer("t");
        counter.increment(5);
        timer.record(1.0);

        factory.clear();
        let snapshot = factory.snapshot();
        assert_eq!(snapshot.counter("c"), 0);
        assert!(snapshot.gauge("t.P50").is_none());

        counter.increment(1);
        assert_eq!(factory.snapshot().counter("c"), 1);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let factory = LocalFactory::new();
        std::thread::scope(|s| {
            for _ in 0..8 {
                let factory = factory.clone();
                s.spawn(move || {
                    let counter = factory.counter("hits");
                    let timer = factory.timer("lat");
                    for _ in 0..1000 {
                        counter.increment(1);
                        timer.record(0.5);
                    }
                });
            }
        });
        let snapshot = factory.snapshot();
        assert_eq!(snapshot.counter("hits"), 8000);
        assert_eq!(snapshot.sample_count("lat"), 8000);
    }
}
