//! Factory backed by the installed `metrics` recorder.
//!
//! Consumers install their own recorder (prometheus, statsd, ...); without
//! one, all handles are no-ops. Resolution happens when the handle is
//! created, so a decorator built inside
//! [`metrics::with_local_recorder`] keeps reporting to that recorder
//! after the scope ends.

use metrics::{Counter, Histogram};

use super::MetricsFactory;

/// [`MetricsFactory`] that registers series with the current recorder.
///
/// Names are passed through verbatim (`GetTrace.attempts`), so exporters
/// that restrict the character set may rewrite them.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecorderFactory;

impl RecorderFactory {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsFactory for RecorderFactory {
    fn counter(&self, name: &str) -> Counter {
        metrics::counter!(name.to_owned())
    }

    fn timer(&self, name: &str) -> Histogram {
        metrics::histogram!(name.to_owned())
    }
}
