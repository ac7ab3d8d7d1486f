//! spanstore-metrics - metrics decorators for span stores
//!
//! This crate wraps [`SpanReader`] and [`SpanWriter`] implementations in
//! decorators that record per-operation telemetry (attempts, successes,
//! errors, latency by outcome, response sizes) through an injected
//! [`MetricsFactory`], while passing results and errors through unchanged.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use spanstore_metrics::{
//!     LocalFactory, ReadMetricsDecorator, Result, SpanReader, StoreError, Trace, TraceId,
//!     TraceQueryParameters,
//! };
//!
//! struct EmptyStore;
//!
//! #[async_trait]
//! impl SpanReader for EmptyStore {
//!     async fn get_services(&self) -> Result<Vec<String>> {
//!         Ok(vec![])
//!     }
//!     async fn get_operations(&self, _service: &str) -> Result<Vec<String>> {
//!         Ok(vec![])
//!     }
//!     async fn get_trace(&self, trace_id: &TraceId) -> Result<Trace> {
//!         Err(StoreError::TraceNotFound(*trace_id))
//!     }
//!     async fn find_traces(&self, _query: &TraceQueryParameters) -> Result<Vec<Trace>> {
//!         Ok(vec![])
//!     }
//!     async fn find_trace_ids(&self, _query: &TraceQueryParameters) -> Result<Vec<TraceId>> {
//!         Ok(vec![])
//!     }
//! }
//!
//! # block_on(async {
//! let factory = LocalFactory::new();
//! let reader = ReadMetricsDecorator::new(Arc::new(EmptyStore), &factory);
//!
//! let services = reader.get_services().await?;
//! assert!(services.is_empty());
//!
//! let snapshot = factory.snapshot();
//! assert_eq!(snapshot.counter("GetServices.successes"), 1);
//! assert!(snapshot.gauge("GetServices.errLatency.P50").is_none());
//! # Ok::<(), StoreError>(())
//! # })
//! # .unwrap();
//! # fn block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod decorator;
pub mod error;
pub mod factory;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use decorator::{
    Operation, OperationMetrics, ReadMetricsDecorator, ResponseMetrics, WriteMetricsDecorator,
};
pub use error::{Result, StoreError};
pub use factory::{
    LocalConfig, LocalFactory, MetricsFactory, MetricsFactoryExt, Namespaced, RecorderFactory,
    Snapshot,
};
pub use traits::{SpanReader, SpanWriter};
pub use types::{Span, SpanId, Trace, TraceId, TraceQueryParameters};
