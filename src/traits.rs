//! Span store traits.
//!
//! Readers and writers are separate capabilities so that decorators
//! (e.g. [`ReadMetricsDecorator`](crate::ReadMetricsDecorator)) can wrap
//! each independently and be stacked anywhere the plain trait is expected.

use async_trait::async_trait;

use crate::Result;
use crate::types::{Span, Trace, TraceId, TraceQueryParameters};

/// Read-only query interface over stored spans.
#[async_trait]
pub trait SpanReader: Send + Sync {
    /// All service names that have reported spans.
    async fn get_services(&self) -> Result<Vec<String>>;

    /// Operation names recorded for `service`.
    async fn get_operations(&self, service: &str) -> Result<Vec<String>>;

    /// Fetch a single trace by id.
    async fn get_trace(&self, trace_id: &TraceId) -> Result<Trace>;

    /// Find traces matching `query`.
    async fn find_traces(&self, query: &TraceQueryParameters) -> Result<Vec<Trace>>;

    /// Find ids of traces matching `query` without loading their spans.
    async fn find_trace_ids(&self, query: &TraceQueryParameters) -> Result<Vec<TraceId>>;
}

/// Write interface for persisting spans.
#[async_trait]
pub trait SpanWriter: Send + Sync {
    async fn write_span(&self, span: &Span) -> Result<()>;
}
