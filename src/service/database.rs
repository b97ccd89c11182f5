//! The database layer of the demo chain.

use std::time::Duration;

use crate::trace::TraceContext;

use super::simulate_io;

/// A stand-in database client. The real work is simulated; the span
/// discipline is not.
pub struct Database {
    latency: Duration,
}

impl Database {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Runs a named query under a `PerformQuery` span nested in the caller's
    /// context.
    pub async fn perform_query(&self, cx: &TraceContext, query_name: &str) {
        let (mut span, _cx) = cx.start_span("PerformQuery");
        span.set_tag("queryName", query_name);

        simulate_io(self.latency).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Collector, Tracer};

    #[tokio::test]
    async fn query_span_nests_under_caller() {
        let collector = Collector::new();
        let tracer = Tracer::new(collector.clone());
        let db = Database::new(Duration::ZERO);

        let (caller, cx) = tracer.root().start_span("caller");
        let caller_id = caller.id();
        db.perform_query(&cx, "q-123").await;
        caller.finish();

        let spans = collector.finished();
        let query = spans.iter().find(|s| s.operation() == "PerformQuery").unwrap();
        assert_eq!(query.parent(), Some(caller_id));
        assert_eq!(query.tag("queryName"), Some("q-123"));
        assert!(query.finished_at().is_some());
    }
}
