use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use spanstore_metrics::{
    LocalFactory, Result, Span, SpanId, SpanWriter, StoreError, TraceId, WriteMetricsDecorator,
};

/// Writer that stores spans in memory and rejects spans without a service.
#[derive(Default)]
struct MemoryWriter {
    spans: Mutex<Vec<Span>>,
}

#[async_trait]
impl SpanWriter for MemoryWriter {
    async fn write_span(&self, span: &Span) -> Result<()> {
        if span.service_name.is_empty() {
            return Err(StoreError::InvalidQuery("span has no service".into()));
        }
        self.spans.lock().unwrap().push(span.clone());
        Ok(())
    }
}

fn span(service: &str, id: u64) -> Span {
    Span::new(TraceId::from_low(1), SpanId(id), service, "op").with_tag("k", "v")
}

#[tokio::test]
async fn write_span_success_and_failure() {
    let factory = LocalFactory::new();
    let inner = Arc::new(MemoryWriter::default());
    let writer = WriteMetricsDecorator::new(inner.clone(), &factory);

    writer.write_span(&span("frontend", 1)).await.unwrap();
    writer.write_span(&span("backend", 2)).await.unwrap();
    let err = writer.write_span(&span("", 3)).await.unwrap_err();
    assert_eq!(err, StoreError::InvalidQuery("span has no service".into()));

    let stored = inner.spans.lock().unwrap().clone();
    assert_eq!(stored, vec![span("frontend", 1), span("backend", 2)]);

    let snapshot = factory.snapshot();
    assert_eq!(snapshot.counter("WriteSpan.attempts"), 3);
    assert_eq!(snapshot.counter("WriteSpan.successes"), 2);
    assert_eq!(snapshot.counter("WriteSpan.errors"), 1);
    assert_eq!(snapshot.sample_count("WriteSpan.okLatency"), 2);
    assert_eq!(snapshot.sample_count("WriteSpan.errLatency"), 1);
}

#[tokio::test]
async fn write_span_has_no_response_metric() {
    let factory = LocalFactory::new();
    let writer = WriteMetricsDecorator::new(Arc::new(MemoryWriter::default()), &factory);

    writer.write_span(&span("frontend", 1)).await.unwrap();

    let snapshot = factory.snapshot();
    assert!(snapshot.gauges.contains_key("WriteSpan.okLatency.P50"));
    assert!(!snapshot.gauges.keys().any(|k| k.starts_with("WriteSpan.responses")));
    assert!(!snapshot.gauges.contains_key("WriteSpan.errLatency.P50"));
}
