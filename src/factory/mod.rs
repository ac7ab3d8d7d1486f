//! Metrics factories.
//!
//! A [`MetricsFactory`] hands out named metric handles. Handles are the
//! `metrics` crate's [`Counter`] and [`Histogram`], so anything that can
//! back those (an installed recorder, the in-process [`LocalFactory`], a
//! test recorder) can sit behind a decorator.
//!
//! Handles are created once and held for the lifetime of the decorator;
//! factories are never consulted on the call path.

pub mod local;
pub mod recorder;

use std::sync::Arc;

use metrics::{Counter, Histogram};

pub use local::{LocalConfig, LocalFactory, Snapshot};
pub use recorder::RecorderFactory;

/// Source of named counters and timers.
///
/// Asking twice for the same name should return handles to the same
/// series; two decorators built from one factory therefore share their
/// series. Use [`Namespaced`] to keep layers apart.
pub trait MetricsFactory: Send + Sync {
    /// Monotonic counter.
    fn counter(&self, name: &str) -> Counter;

    /// Sample distribution, used for both durations (seconds) and sizes.
    fn timer(&self, name: &str) -> Histogram;
}

/// Factory adapter that prefixes every metric name with `prefix.`.
#[derive(Clone)]
pub struct Namespaced {
    inner: Arc<dyn MetricsFactory>,
    prefix: String,
}

impl Namespaced {
    /// Scope `inner` under `prefix`. An empty prefix leaves names unchanged.
    pub fn new(inner: Arc<dyn MetricsFactory>, prefix: impl Into<String>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    fn scoped(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_owned()
        } else {
            crate::telemetry::metric_name(&self.prefix, name)
        }
    }
}

impl MetricsFactory for Namespaced {
    fn counter(&self, name: &str) -> Counter {
        self.inner.counter(&self.scoped(name))
    }

    fn timer(&self, name: &str) -> Histogram {
        self.inner.timer(&self.scoped(name))
    }
}

/// Convenience constructors for factories held in an [`Arc`].
pub trait MetricsFactoryExt {
    /// Scope this factory under `prefix`; see [`Namespaced`].
    fn namespace(self: Arc<Self>, prefix: impl Into<String>) -> Namespaced;
}

impl<F: MetricsFactory + 'static> MetricsFactoryExt for F {
    fn namespace(self: Arc<Self>, prefix: impl Into<String>) -> Namespaced {
        Namespaced::new(self, prefix)
    }
}

impl std::fmt::Debug for Namespaced {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespaced")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
