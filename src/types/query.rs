//! Trace search parameters.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// Parameters for finding traces.
///
/// All fields are optional filters; interpretation (and validation) is up
/// to the store.
///
/// ```rust
/// # use spanstore_metrics::TraceQueryParameters;
/// # use std::time::Duration;
/// let query = TraceQueryParameters::new()
///     .service_name("frontend")
///     .operation_name("GET /dispatch")
///     .tag("http.status_code", "500")
///     .duration_min(Duration::from_millis(100))
///     .num_traces(20);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceQueryParameters {
    pub service_name: Option<String>,
    pub operation_name: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub start_time_min: Option<SystemTime>,
    pub start_time_max: Option<SystemTime>,
    pub duration_min: Option<Duration>,
    pub duration_max: Option<Duration>,
    /// Maximum number of traces to return; `None` leaves it to the store.
    pub num_traces: Option<usize>,
}

impl TraceQueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service_name(mut self, service: impl Into<String>) -> Self {
        self.service_name = Some(service.into());
        self
    }

    pub fn operation_name(mut self, operation: impl Into<String>) -> Self {
        self.operation_name = Some(operation.into());
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Restrict to traces starting within `[min, max]`.
    pub fn start_time_range(mut self, min: SystemTime, max: SystemTime) -> Self {
        self.start_time_min = Some(min);
        self.start_time_max = Some(max);
        self
    }

    pub fn duration_min(mut self, min: Duration) -> Self {
        self.duration_min = Some(min);
        self
    }

    pub fn duration_max(mut self, max: Duration) -> Self {
        self.duration_max = Some(max);
        self
    }

    pub fn num_traces(mut self, n: usize) -> Self {
        self.num_traces = Some(n);
        self
    }
}
