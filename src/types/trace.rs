//! Trace and span types.
//!
//! Only the shape the store interfaces need: identifiers, a flat span
//! record, and a trace as a bag of spans.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// 128-bit trace identifier, split into high and low halves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraceId {
    pub high: u64,
    pub low: u64,
}

impl TraceId {
    /// Create a trace id from its two halves.
    pub fn new(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    /// Create a 64-bit trace id (high half zero).
    pub fn from_low(low: u64) -> Self {
        Self { high: 0, low }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.high == 0 {
            write!(f, "{:x}", self.low)
        } else {
            write!(f, "{:x}{:016x}", self.high, self.low)
        }
    }
}

impl FromStr for TraceId {
    type Err = StoreError;

    /// Parse a hex trace id of 1 to 32 digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StoreError::InvalidQuery(format!("invalid trace id: {s:?}"));
        if s.is_empty() || s.len() > 32 || !s.is_ascii() {
            return Err(invalid());
        }
        let (high, low) = if s.len() > 16 {
            s.split_at(s.len() - 16)
        } else {
            ("", s)
        };
        let high = if high.is_empty() {
            0
        } else {
            u64::from_str_radix(high, 16).map_err(|_| invalid())?
        };
        let low = u64::from_str_radix(low, 16).map_err(|_| invalid())?;
        Ok(Self { high, low })
    }
}

/// 64-bit span identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanId(pub u64);

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// A single timed operation within a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    /// Parent span, `None` for the root.
    pub parent_span_id: Option<SpanId>,
    pub service_name: String,
    pub operation_name: String,
    pub start_time: SystemTime,
    pub duration: Duration,
    pub tags: BTreeMap<String, String>,
}

impl Span {
    /// Create a span with the required identity fields.
    ///
    /// Start time defaults to the Unix epoch and duration to zero.
    pub fn new(
        trace_id: TraceId,
        span_id: SpanId,
        service_name: impl Into<String>,
        operation_name: impl Into<String>,
    ) -> Self {
        Self {
            trace_id,
            span_id,
            parent_span_id: None,
            service_name: service_name.into(),
            operation_name: operation_name.into(),
            start_time: SystemTime::UNIX_EPOCH,
            duration: Duration::ZERO,
            tags: BTreeMap::new(),
        }
    }

    /// Set the parent span.
    pub fn with_parent(mut self, parent: SpanId) -> Self {
        self.parent_span_id = Some(parent);
        self
    }

    /// Set start time and duration.
    pub fn with_timing(mut self, start_time: SystemTime, duration: Duration) -> Self {
        self.start_time = start_time;
        self.duration = duration;
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// A trace: every span sharing one trace id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub spans: Vec<Span>,
}

impl Trace {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Number of spans in the trace.
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_id_display_low_only() {
        assert_eq!(TraceId::from_low(0xabc).to_string(), "abc");
    }

    #[test]
    fn trace_id_display_pads_low_half() {
        assert_eq!(TraceId::new(1, 2).to_string(), "10000000000000002");
    }

    #[test]
    fn trace_id_parses_both_widths() {
        assert_eq!("abc".parse::<TraceId>().unwrap(), TraceId::from_low(0xabc));
        assert_eq!(
            "10000000000000002".parse::<TraceId>().unwrap(),
            TraceId::new(1, 2)
        );
    }

    #[test]
    fn trace_id_rejects_bad_input() {
        assert!("".parse::<TraceId>().is_err());
        assert!("xyz".parse::<TraceId>().is_err());
        assert!("1".repeat(33).parse::<TraceId>().is_err());
    }

    #[test]
    fn trace_counts_spans() {
        let id = TraceId::from_low(1);
        let trace = Trace::new(vec![
            Span::new(id, SpanId(1), "frontend", "GET /"),
            Span::new(id, SpanId(2), "backend", "query").with_parent(SpanId(1)),
        ]);
        assert_eq!(trace.span_count(), 2);
        assert!(!trace.is_empty());
        assert!(Trace::default().is_empty());
    }
}
