//! Hierarchical request tracing.
//!
//! Every traced operation records a [`Span`]; spans nest the way the call
//! stack nests. The linkage is carried by a [`TraceContext`] — an immutable
//! value threaded as an explicit argument through every layer. There is no
//! thread-local, no ambient lookup: if a function can start a child span, a
//! context was handed to it.
//!
//! ## The contract
//!
//! - [`TraceContext::start_span`] creates a child of the carrier's current
//!   span (a root span if the carrier is empty) and returns a *derived*
//!   context pointing at the new span. The context you were given is never
//!   touched — pass the derived one to anything that should nest under you.
//! - The returned [`SpanGuard`] owns the span. It finishes and exports the
//!   span when dropped, so every exit path — early return, error, panic,
//!   a cancelled future — closes the span exactly once.
//! - Finished spans go to a [`SpanSink`](sink::SpanSink). Export is
//!   best-effort: a failing sink is logged and ignored, never surfaced to
//!   the request that produced the span.
//!
//! ```rust
//! use arbor::trace::{Collector, Tracer};
//!
//! let collector = Collector::new();
//! let tracer = Tracer::new(collector.clone());
//!
//! let (mut outer, cx) = tracer.root().start_span("outer");
//! outer.set_tag("kind", "demo");
//! {
//!     let (inner, _cx) = cx.start_span("inner");
//!     drop(inner); // finished + exported here
//! }
//! outer.finish();
//!
//! let spans = collector.finished();
//! assert_eq!(spans[0].parent(), Some(spans[1].id())); // inner under outer
//! ```

mod sink;
mod span;

pub use sink::{Collector, LogSink, SinkError, SpanSink};
pub use span::{Span, SpanGuard};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

/// Process-unique span identity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SpanId(u64);

impl std::fmt::Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The process-wide tracing facility: allocates span ids and owns the export
/// sink. Cloning is cheap (one `Arc`); every clone feeds the same sink.
#[derive(Clone)]
pub struct Tracer {
    inner: Arc<TracerInner>,
}

struct TracerInner {
    next_id: AtomicU64,
    sink: Box<dyn SpanSink>,
}

impl Tracer {
    pub fn new(sink: impl SpanSink) -> Self {
        Self {
            inner: Arc::new(TracerInner {
                next_id: AtomicU64::new(1),
                sink: Box::new(sink),
            }),
        }
    }

    /// An empty context: the next span started from it is a root span.
    pub fn root(&self) -> TraceContext {
        TraceContext { tracer: self.clone(), current: None }
    }

    fn next_id(&self) -> SpanId {
        SpanId(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Hands a finished span to the sink. Telemetry is best-effort — a sink
    /// failure is logged and the span dropped, never propagated.
    pub(crate) fn export(&self, span: Span) {
        if let Err(err) = self.inner.sink.export(&span) {
            warn!(span = %span.id(), operation = span.operation(), "span export failed: {err}");
        }
    }
}

/// The carrier that lets a callee's span find its caller's span.
///
/// Immutable: deriving a child context produces a new value. A context is
/// request-local — it is cloned down one logical call chain and never shared
/// across concurrent requests.
#[derive(Clone)]
pub struct TraceContext {
    tracer: Tracer,
    current: Option<SpanId>,
}

impl TraceContext {
    /// Starts a span as a child of this context's current span.
    ///
    /// Returns the guard that owns the new span and the derived context to
    /// pass to deeper layers. Each span is finished exactly once, by its
    /// guard.
    pub fn start_span(&self, operation: impl Into<String>) -> (SpanGuard, TraceContext) {
        let id = self.tracer.next_id();
        let span = Span::new(id, self.current, operation.into());
        let derived = TraceContext { tracer: self.tracer.clone(), current: Some(id) };
        (SpanGuard::new(span, self.tracer.clone()), derived)
    }

    /// The span id a child started from this context would nest under.
    pub fn current_span(&self) -> Option<SpanId> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_tracer() -> (Tracer, Collector) {
        let collector = Collector::new();
        (Tracer::new(collector.clone()), collector)
    }

    #[test]
    fn root_span_has_no_parent() {
        let (tracer, collector) = recording_tracer();
        let (guard, _cx) = tracer.root().start_span("root");
        guard.finish();

        let spans = collector.finished();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].operation(), "root");
        assert_eq!(spans[0].parent(), None);
        assert!(spans[0].finished_at().is_some());
    }

    #[test]
    fn child_nests_under_carrier_span() {
        let (tracer, collector) = recording_tracer();
        let (parent, cx) = tracer.root().start_span("parent");
        let parent_id = parent.id();

        let (child, _cx) = cx.start_span("child");
        let child_id = child.id();
        assert_ne!(parent_id, child_id);
        child.finish();
        parent.finish();

        let spans = collector.finished();
        let child = spans.iter().find(|s| s.operation() == "child").unwrap();
        assert_eq!(child.parent(), Some(parent_id));
    }

    #[test]
    fn derived_context_does_not_mutate_original() {
        let (tracer, _collector) = recording_tracer();
        let root_cx = tracer.root();
        let (guard, derived) = root_cx.start_span("op");

        assert_eq!(root_cx.current_span(), None);
        assert_eq!(derived.current_span(), Some(guard.id()));
    }

    #[test]
    fn siblings_share_a_parent() {
        let (tracer, collector) = recording_tracer();
        let (parent, cx) = tracer.root().start_span("parent");
        let parent_id = parent.id();

        let (a, _) = cx.start_span("a");
        let (b, _) = cx.start_span("b");
        a.finish();
        b.finish();
        parent.finish();

        let spans = collector.finished();
        for op in ["a", "b"] {
            let s = spans.iter().find(|s| s.operation() == op).unwrap();
            assert_eq!(s.parent(), Some(parent_id));
        }
    }

    #[test]
    fn guard_finishes_on_drop() {
        let (tracer, collector) = recording_tracer();
        {
            let (_guard, _cx) = tracer.root().start_span("scoped");
            // dropped at end of scope, no explicit finish
        }
        let spans = collector.finished();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].finished_at().is_some());
    }

    #[test]
    fn guard_finishes_when_operation_panics() {
        let (tracer, collector) = recording_tracer();
        let tracer2 = tracer.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let (_guard, _cx) = tracer2.root().start_span("doomed");
            panic!("operation failed");
        }));
        assert!(result.is_err());

        let spans = collector.finished();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].finished_at().is_some());
    }
}
