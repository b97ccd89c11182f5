//! Where finished spans go.

use std::sync::{Arc, Mutex};

use tracing::debug;

use super::Span;

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// A collaborator that consumes finished spans.
///
/// Sinks must not block: the export happens on the request path, so a sink
/// that talks to the network buffers internally and drains elsewhere. The
/// tracer treats export as best-effort — an `Err` is logged and the span
/// dropped, never surfaced to the request.
pub trait SpanSink: Send + Sync + 'static {
    fn export(&self, span: &Span) -> Result<(), SinkError>;
}

/// Emits each finished span through the `tracing` macros. The default sink
/// for locally run services.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl SpanSink for LogSink {
    fn export(&self, span: &Span) -> Result<(), SinkError> {
        let elapsed = span
            .finished_at()
            .and_then(|end| end.duration_since(span.started_at()).ok())
            .unwrap_or_default();
        let parent = span.parent().map(|p| p.to_string()).unwrap_or_default();
        debug!(
            id = %span.id(),
            parent = %parent,
            operation = span.operation(),
            elapsed_ms = elapsed.as_millis() as u64,
            "span finished"
        );
        Ok(())
    }
}

/// An in-memory sink: keeps every exported span, in export order.
///
/// This is the sink to hand a [`Tracer`](super::Tracer) in tests — assert on
/// parentage, tags, and finish times after the fact. Clones share the same
/// buffer.
#[derive(Clone, Default)]
pub struct Collector {
    spans: Arc<Mutex<Vec<Span>>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of everything exported so far, in export order.
    pub fn finished(&self) -> Vec<Span> {
        self.spans.lock().expect("collector lock").clone()
    }

    pub fn len(&self) -> usize {
        self.spans.lock().expect("collector lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpanSink for Collector {
    fn export(&self, span: &Span) -> Result<(), SinkError> {
        self.spans.lock().expect("collector lock").push(span.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Tracer;

    /// A sink that always fails, standing in for an unreachable telemetry
    /// backend.
    struct Unreachable;

    impl SpanSink for Unreachable {
        fn export(&self, _span: &Span) -> Result<(), SinkError> {
            Err("telemetry backend unavailable".into())
        }
    }

    #[test]
    fn failed_export_does_not_propagate() {
        let tracer = Tracer::new(Unreachable);
        // Finishing the span routes through the failing sink; the operation
        // itself must remain unaffected.
        let (guard, _cx) = tracer.root().start_span("op");
        guard.finish();
    }

    #[test]
    fn collector_preserves_export_order() {
        let collector = Collector::new();
        let tracer = Tracer::new(collector.clone());

        let (a, _) = tracer.root().start_span("first");
        a.finish();
        let (b, _) = tracer.root().start_span("second");
        b.finish();

        let ops: Vec<_> = collector
            .finished()
            .iter()
            .map(|s| s.operation().to_owned())
            .collect();
        assert_eq!(ops, ["first", "second"]);
    }
}
