//! Metrics decorator for [`SpanWriter`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::operation::Operation;
use crate::Result;
use crate::factory::MetricsFactory;
use crate::telemetry;
use crate::traits::SpanWriter;
use crate::types::Span;

/// Decorator that wraps a [`SpanWriter`] and records `WriteSpan` metrics.
///
/// Same semantics as [`ReadMetricsDecorator`](super::ReadMetricsDecorator),
/// minus the response-size metric: a write has no result to measure.
pub struct WriteMetricsDecorator {
    inner: Arc<dyn SpanWriter>,
    write_span: Operation<()>,
}

impl WriteMetricsDecorator {
    /// Wrap a writer, registering its metrics with `factory`.
    pub fn new(inner: Arc<dyn SpanWriter>, factory: &dyn MetricsFactory) -> Self {
        let write_span = Operation::new(factory, telemetry::WRITE_SPAN);
        debug!(operation = write_span.name(), "span writer instrumented");
        Self { inner, write_span }
    }
}

#[async_trait]
impl SpanWriter for WriteMetricsDecorator {
    async fn write_span(&self, span: &Span) -> Result<()> {
        self.write_span
            .instrument(|| self.inner.write_span(span))
            .await
    }
}
