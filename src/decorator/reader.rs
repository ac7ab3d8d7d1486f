//! Metrics decorator for [`SpanReader`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::operation::Operation;
use crate::Result;
use crate::factory::MetricsFactory;
use crate::telemetry;
use crate::traits::SpanReader;
use crate::types::{Trace, TraceId, TraceQueryParameters};

/// Decorator that wraps a [`SpanReader`] and records per-operation metrics.
///
/// Every method delegates to the wrapped reader and returns its result
/// unchanged. Each operation records attempts, successes, errors and
/// latency split by outcome, plus a `responses` size distribution:
///
/// | operation       | `responses` sample        |
/// |-----------------|---------------------------|
/// | `GetServices`   | number of services        |
/// | `GetOperations` | number of operations      |
/// | `GetTrace`      | number of spans           |
/// | `FindTraces`    | number of traces          |
/// | `FindTraceIDs`  | number of trace ids       |
///
/// The decorator is itself a [`SpanReader`], so decorators stack; give each
/// layer its own factory or [`Namespaced`](crate::Namespaced) scope to keep
/// their series apart.
pub struct ReadMetricsDecorator {
    inner: Arc<dyn SpanReader>,
    get_services: Operation<Vec<String>>,
    get_operations: Operation<Vec<String>>,
    get_trace: Operation<Trace>,
    find_traces: Operation<Vec<Trace>>,
    find_trace_ids: Operation<Vec<TraceId>>,
}

impl ReadMetricsDecorator {
    /// Wrap a reader, registering its metrics with `factory`.
    pub fn new(inner: Arc<dyn SpanReader>, factory: &dyn MetricsFactory) -> Self {
        let decorator = Self {
            inner,
            get_services: Operation::with_responses(factory, telemetry::GET_SERVICES, Vec::len),
            get_operations: Operation::with_responses(
                factory,
                telemetry::GET_OPERATIONS,
                Vec::len,
            ),
            get_trace: Operation::with_responses(factory, telemetry::GET_TRACE, Trace::span_count),
            find_traces: Operation::with_responses(factory, telemetry::FIND_TRACES, Vec::len),
            find_trace_ids: Operation::with_responses(
                factory,
                telemetry::FIND_TRACE_IDS,
                Vec::len,
            ),
        };
        debug!(
            operations = ?[
                decorator.get_services.name(),
                decorator.get_operations.name(),
                decorator.get_trace.name(),
                decorator.find_traces.name(),
                decorator.find_trace_ids.name(),
            ],
            "span reader instrumented"
        );
        decorator
    }
}

#[async_trait]
impl SpanReader for ReadMetricsDecorator {
    async fn get_services(&self) -> Result<Vec<String>> {
        self.get_services
            .instrument(|| self.inner.get_services())
            .await
    }

    async fn get_operations(&self, service: &str) -> Result<Vec<String>> {
        self.get_operations
            .instrument(|| self.inner.get_operations(service))
            .await
    }

    async fn get_trace(&self, trace_id: &TraceId) -> Result<Trace> {
        self.get_trace
            .instrument(|| self.inner.get_trace(trace_id))
            .await
    }

    async fn find_traces(&self, query: &TraceQueryParameters) -> Result<Vec<Trace>> {
        self.find_traces
            .instrument(|| self.inner.find_traces(query))
            .await
    }

    async fn find_trace_ids(&self, query: &TraceQueryParameters) -> Result<Vec<TraceId>> {
        self.find_trace_ids
            .instrument(|| self.inner.find_trace_ids(query))
            .await
    }
}
