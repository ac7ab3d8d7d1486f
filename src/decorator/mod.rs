//! Metrics-instrumenting store decorators.
//!
//! [`ReadMetricsDecorator`] and [`WriteMetricsDecorator`] implement the
//! trait they wrap and delegate every call through
//! [`Operation::instrument`], keeping the timing and outcome logic in a
//! single place.
//!
//! # Outcome accounting
//!
//! Per call, in order: the attempt is counted, the inner call runs, then
//! exactly one of success or error is recorded with the elapsed time.
//! An `Ok` result is a success even when it is empty. A call abandoned
//! mid-flight (future dropped, inner panic) is recorded as an error, so
//! `attempts == successes + errors` holds once no calls are in flight.

mod operation;
mod reader;
mod writer;

pub use operation::{Operation, OperationMetrics, ResponseMetrics};
pub use reader::ReadMetricsDecorator;
pub use writer::WriteMetricsDecorator;
