//! Per-operation metric bundles and the shared instrumentation helper.

use std::future::Future;
use std::time::{Duration, Instant};

use metrics::{Counter, Histogram};

use crate::factory::MetricsFactory;
use crate::telemetry::{self, metric_name};

/// Counters and latency timers for one operation.
///
/// Built once from a factory and reused for every call.
pub struct OperationMetrics {
    name: String,
    attempts: Counter,
    successes: Counter,
    errors: Counter,
    ok_latency: Histogram,
    err_latency: Histogram,
}

impl OperationMetrics {
    /// Register `name.attempts`, `name.successes`, `name.errors`,
    /// `name.okLatency` and `name.errLatency` with `factory`.
    pub fn new(factory: &dyn MetricsFactory, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            attempts: factory.counter(&metric_name(name, telemetry::ATTEMPTS)),
            successes: factory.counter(&metric_name(name, telemetry::SUCCESSES)),
            errors: factory.counter(&metric_name(name, telemetry::ERRORS)),
            ok_latency: factory.timer(&metric_name(name, telemetry::OK_LATENCY)),
            err_latency: factory.timer(&metric_name(name, telemetry::ERR_LATENCY)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Count an attempt and start its clock.
    fn begin(&self) -> InFlight<'_> {
        self.attempts.increment(1);
        InFlight {
            metrics: self,
            started: Instant::now(),
            settled: false,
        }
    }

    fn record_success(&self, elapsed: Duration) {
        self.successes.increment(1);
        self.ok_latency.record(elapsed.as_secs_f64());
    }

    fn record_error(&self, elapsed: Duration) {
        self.errors.increment(1);
        self.err_latency.record(elapsed.as_secs_f64());
    }
}

impl std::fmt::Debug for OperationMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationMetrics")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A call whose attempt has been counted but whose outcome has not.
///
/// Dropped without [`settle`](Self::settle) means the caller abandoned the
/// future (or the inner call panicked); that is recorded as an error.
struct InFlight<'a> {
    metrics: &'a OperationMetrics,
    started: Instant,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, ok: bool) {
        self.settled = true;
        let elapsed = self.started.elapsed();
        if ok {
            self.metrics.record_success(elapsed);
        } else {
            self.metrics.record_error(elapsed);
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.metrics.record_error(self.started.elapsed());
        }
    }
}

/// Size distribution of successful results.
pub struct ResponseMetrics<T> {
    responses: Histogram,
    size: fn(&T) -> usize,
}

impl<T> ResponseMetrics<T> {
    /// Register `name.responses`; `size` projects a result to its element count.
    pub fn new(factory: &dyn MetricsFactory, name: &str, size: fn(&T) -> usize) -> Self {
        Self {
            responses: factory.timer(&metric_name(name, telemetry::RESPONSES)),
            size,
        }
    }

    fn record(&self, value: &T) {
        self.responses.record((self.size)(value) as f64);
    }
}

/// One instrumented operation returning `T`.
///
/// Holds the operation's [`OperationMetrics`] and, for operations whose
/// result has a size, its [`ResponseMetrics`].
pub struct Operation<T> {
    metrics: OperationMetrics,
    responses: Option<ResponseMetrics<T>>,
}

impl<T> Operation<T> {
    /// Operation without a response-size metric.
    pub fn new(factory: &dyn MetricsFactory, name: &str) -> Self {
        Self {
            metrics: OperationMetrics::new(factory, name),
            responses: None,
        }
    }

    /// Operation that also records `size(result)` for each success.
    pub fn with_responses(factory: &dyn MetricsFactory, name: &str, size: fn(&T) -> usize) -> Self {
        Self {
            metrics: OperationMetrics::new(factory, name),
            responses: Some(ResponseMetrics::new(factory, name, size)),
        }
    }

    pub fn name(&self) -> &str {
        self.metrics.name()
    }

    pub fn has_responses(&self) -> bool {
        self.responses.is_some()
    }

    /// Run `call` and record its outcome.
    ///
    /// The attempt is counted before `call` is invoked. `Ok` counts as a
    /// success (empty results included) and feeds the response metric;
    /// `Err` counts as an error. The result is returned untouched.
    pub async fn instrument<E, F, Fut>(&self, call: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let in_flight = self.metrics.begin();
        let result = call().await;
        match &result {
            Ok(value) => {
                in_flight.settle(true);
                if let Some(responses) = &self.responses {
                    responses.record(value);
                }
            }
            Err(_) => in_flight.settle(false),
        }
        result
    }
}

impl<T> std::fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.metrics.name)
            .field("responses", &self.responses.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::factory::LocalFactory;

    #[tokio::test]
    async fn success_feeds_ok_latency_and_responses() {
        let factory = LocalFactory::new();
        let op: Operation<Vec<u8>> = Operation::with_responses(&factory, "Op", Vec::len);

        let result: Result<Vec<u8>, ()> = op.instrument(|| async { Ok(vec![1, 2, 3]) }).await;
        assert_eq!(result, Ok(vec![1, 2, 3]));

        let snapshot = factory.snapshot();
        assert_eq!(snapshot.counter("Op.attempts"), 1);
        assert_eq!(snapshot.counter("Op.successes"), 1);
        assert_eq!(snapshot.counter("Op.errors"), 0);
        assert_eq!(snapshot.sample_count("Op.okLatency"), 1);
        assert_eq!(snapshot.sample_count("Op.errLatency"), 0);
        assert_eq!(snapshot.sample_count("Op.responses"), 1);
    }

    #[tokio::test]
    async fn error_skips_responses() {
        let factory = LocalFactory::new();
        let op: Operation<Vec<u8>> = Operation::with_responses(&factory, "Op", Vec::len);

        let result: Result<Vec<u8>, &str> = op.instrument(|| async { Err("boom") }).await;
        assert_eq!(result, Err("boom"));

        let snapshot = factory.snapshot();
        assert_eq!(snapshot.counter("Op.attempts"), 1);
        assert_eq!(snapshot.counter("Op.errors"), 1);
        assert_eq!(snapshot.sample_count("Op.errLatency"), 1);
        assert_eq!(snapshot.sample_count("Op.okLatency"), 0);
        assert_eq!(snapshot.sample_count("Op.responses"), 0);
    }

    #[tokio::test]
    async fn without_responses_no_response_series() {
        let factory = LocalFactory::new();
        let op: Operation<()> = Operation::new(&factory, "Op");
        assert!(!op.has_responses());

        let _: Result<(), ()> = op.instrument(|| async { Ok(()) }).await;
        assert_eq!(factory.snapshot().sample_count("Op.responses"), 0);
        assert!(!factory.snapshot().gauges.keys().any(|k| k.starts_with("Op.responses")));
    }

    #[tokio::test]
    async fn attempt_counted_before_call_runs() {
        let factory = LocalFactory::new();
        let op: Operation<u64> = Operation::new(&factory, "Op");

        let seen: Result<u64, ()> = op
            .instrument(|| {
                let attempts = factory.snapshot().counter("Op.attempts");
                async move { Ok(attempts) }
            })
            .await;
        assert_eq!(seen, Ok(1));
    }

    #[tokio::test]
    async fn dropped_call_counts_as_error() {
        let factory = LocalFactory::new();
        let op: Operation<()> = Operation::new(&factory, "Op");

        let pending = op.instrument(|| std::future::pending::<Result<(), ()>>());
        let timed_out = tokio::time::timeout(Duration::from_millis(5), pending).await;
        assert!(timed_out.is_err());

        let snapshot = factory.snapshot();
        assert_eq!(snapshot.counter("Op.attempts"), 1);
        assert_eq!(snapshot.counter("Op.successes"), 0);
        assert_eq!(snapshot.counter("Op.errors"), 1);
        assert_eq!(snapshot.sample_count("Op.errLatency"), 1);
    }

    async fn failing_hard() -> Result<(), ()> {
        panic!("inner call failed")
    }

    #[tokio::test]
    async fn panicking_call_counts_as_error() {
        let factory = LocalFactory::new();
        let op: Arc<Operation<()>> = Arc::new(Operation::new(&factory, "Op"));

        let task = {
            let op = Arc::clone(&op);
            tokio::spawn(async move { op.instrument(failing_hard).await })
        };
        let joined = task.await;
        assert!(joined.is_err_and(|e| e.is_panic()));

        let snapshot = factory.snapshot();
        assert_eq!(snapshot.counter("Op.attempts"), 1);
        assert_eq!(snapshot.counter("Op.successes"), 0);
        assert_eq!(snapshot.counter("Op.errors"), 1);
        assert_eq!(snapshot.sample_count("Op.errLatency"), 1);
        assert_eq!(snapshot.sample_count("Op.okLatency"), 0);
    }
}
