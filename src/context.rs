//! Per-request context handed to every handler.

use crate::trace::TraceContext;

/// Request-scoped context.
///
/// Carries the [`TraceContext`] whose current span is this request's span —
/// anything a handler calls with it nests under the request. One value per
/// request, never shared across concurrent requests.
#[derive(Clone)]
pub struct RequestContext {
    trace: TraceContext,
}

impl RequestContext {
    pub(crate) fn new(trace: TraceContext) -> Self {
        Self { trace }
    }

    /// The trace carrier to pass into traced collaborators.
    pub fn trace(&self) -> &TraceContext {
        &self.trace
    }
}
