//! The span record and its scoped guard.

use std::time::SystemTime;

use super::{SpanId, Tracer};

/// A timed, taggable record of one traced operation.
///
/// Lifecycle: created → tags attached → finished. [`finish`](Span::finish)
/// is first-wins: the recorded end time never changes once set, and tags
/// set after finishing are ignored. In normal use a span lives inside a
/// [`SpanGuard`] and the guard drives both transitions.
#[derive(Clone, Debug)]
pub struct Span {
    id: SpanId,
    parent: Option<SpanId>,
    operation: String,
    tags: Vec<(String, String)>,
    started_at: SystemTime,
    finished_at: Option<SystemTime>,
}

impl Span {
    pub(crate) fn new(id: SpanId, parent: Option<SpanId>, operation: String) -> Self {
        Self {
            id,
            parent,
            operation,
            tags: Vec::new(),
            started_at: SystemTime::now(),
            finished_at: None,
        }
    }

    pub fn id(&self) -> SpanId {
        self.id
    }

    pub fn parent(&self) -> Option<SpanId> {
        self.parent
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<SystemTime> {
        self.finished_at
    }

    /// Attaches a tag, overwriting an earlier value for the same key.
    /// No-op once the span is finished.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        if self.finished_at.is_some() {
            return;
        }
        let key = key.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.tags.push((key, value)),
        }
    }

    /// Looks up a tag by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Marks the span finished. First finish wins: calling this again leaves
    /// the recorded end time unchanged.
    pub fn finish(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(SystemTime::now());
        }
    }
}

/// Scoped ownership of an in-flight span.
///
/// Dropping the guard finishes the span and hands it to the tracer's sink —
/// on the error path, during a panic unwind, or when the surrounding future
/// is cancelled, exactly as on the happy path. Each span therefore finishes
/// exactly once.
pub struct SpanGuard {
    span: Option<Span>,
    tracer: Tracer,
}

impl SpanGuard {
    pub(crate) fn new(span: Span, tracer: Tracer) -> Self {
        Self { span: Some(span), tracer }
    }

    pub fn id(&self) -> SpanId {
        self.span.as_ref().expect("span present until drop").id()
    }

    /// Attaches a tag to the owned span.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        if let Some(span) = self.span.as_mut() {
            span.set_tag(key, value);
        }
    }

    /// Finishes the span now. Equivalent to dropping the guard; the explicit
    /// call lets the happy path read as intent.
    pub fn finish(self) {
        drop(self);
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(mut span) = self.span.take() {
            span.finish();
            self.tracer.export(span);
        }
    }
}
