//! Domain types shared by span store readers and writers.

pub mod query;
pub mod trace;

pub use query::TraceQueryParameters;
pub use trace::{Span, SpanId, Trace, TraceId};
