//! Span store error types

use crate::types::TraceId;

/// Errors surfaced by span store readers and writers.
///
/// The metrics decorators never construct these themselves; they pass
/// whatever the wrapped store returns straight through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("trace not found: {0}")]
    TraceNotFound(TraceId),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("store unavailable")]
    Unavailable,

    /// The call was aborted before the store produced a result.
    #[error("operation cancelled")]
    Cancelled,
}

impl StoreError {
    /// Whether this error means the requested trace does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::TraceNotFound(_))
    }
}

/// Result type alias for span store operations
pub type Result<T> = std::result::Result<T, StoreError>;
