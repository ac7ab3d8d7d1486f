//! Telemetry metric name constants.
//!
//! Every instrumented operation `Op` produces the following series, named
//! `Op.<suffix>`:
//!
//! | suffix       | kind    | recorded                                  |
//! |--------------|---------|-------------------------------------------|
//! | `attempts`   | counter | every call                                |
//! | `successes`  | counter | calls returning `Ok`                      |
//! | `errors`     | counter | calls returning `Err` (or dropped early)  |
//! | `okLatency`  | timer   | seconds, successful calls only            |
//! | `errLatency` | timer   | seconds, failed calls only                |
//! | `responses`  | timer   | result size, successful calls only        |
//!
//! `responses` only exists for operations with a meaningful result size.
//! Dashboards key on these names, so they must not change.

/// Separator between operation name and metric suffix.
pub const SEPARATOR: char = '.';

/// Total calls, regardless of outcome.
pub const ATTEMPTS: &str = "attempts";

/// Calls that returned `Ok`.
pub const SUCCESSES: &str = "successes";

/// Calls that returned `Err`.
pub const ERRORS: &str = "errors";

/// Latency of successful calls, in seconds.
pub const OK_LATENCY: &str = "okLatency";

/// Latency of failed calls, in seconds.
pub const ERR_LATENCY: &str = "errLatency";

/// Size of successful results (element count).
pub const RESPONSES: &str = "responses";

// Operation names

pub const GET_SERVICES: &str = "GetServices";
pub const GET_OPERATIONS: &str = "GetOperations";
pub const GET_TRACE: &str = "GetTrace";
pub const FIND_TRACES: &str = "FindTraces";
pub const FIND_TRACE_IDS: &str = "FindTraceIDs";
pub const WRITE_SPAN: &str = "WriteSpan";

/// Join an operation name and a metric suffix: `metric_name("GetTrace", ERRORS)`
/// is `"GetTrace.errors"`.
pub fn metric_name(operation: &str, suffix: &str) -> String {
    format!("{operation}{SEPARATOR}{suffix}")
}
