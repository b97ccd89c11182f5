//! Route registry and request dispatch.
//!
//! One radix tree per HTTP method ([`matchit`]), built once at startup and
//! read-only afterwards — concurrent dispatch shares `&self` with no
//! locking. Registering the same (method, path) pair twice is an error at
//! startup, not a last-write-wins surprise at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as PathTree;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::reply::Reply;
use crate::trace::Tracer;

/// One registered route: its display name ("`GET /time`") and its erased
/// handler.
struct Route<S> {
    name: Arc<str>,
    handler: BoxedHandler<S>,
}

impl<S> Clone for Route<S> {
    fn clone(&self) -> Self {
        Self { name: Arc::clone(&self.name), handler: Arc::clone(&self.handler) }
    }
}

/// The application router: route table, shared state, and the tracer that
/// opens one span per dispatched request.
///
/// `S` is the application's dependency bundle — collaborators constructed
/// once at startup and handed to every handler as `Arc<S>`. There are no
/// process-wide singletons; if a handler needs a dependency, it lives in
/// `S`.
pub struct Router<S> {
    state: Arc<S>,
    tracer: Tracer,
    routes: HashMap<Method, PathTree<Route<S>>>,
}

impl<S: Send + Sync + 'static> Router<S> {
    pub fn new(state: S, tracer: Tracer) -> Self {
        Self { state: Arc::new(state), tracer, routes: HashMap::new() }
    }

    /// Registers a handler for a (method, path) pair. Returns `self` for
    /// chaining with `?`:
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use arbor::{Error, Method, Reply, RequestContext, Router, StatusCode};
    /// # use arbor::trace::{LogSink, Tracer};
    /// # async fn get_time(_: RequestContext, _: Arc<()>) -> Result<Reply, Error> {
    /// #     Ok(Reply::text(StatusCode::OK, ""))
    /// # }
    /// # fn main() -> Result<(), Error> {
    /// let app = Router::new((), Tracer::new(LogSink))
    ///     .on(Method::Get, "/time", get_time)?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// Fails with [`Error::DuplicateRoute`] if the pair is already taken —
    /// registration order does not matter, the second registration loses.
    pub fn on<X>(
        mut self,
        method: Method,
        path: &str,
        handler: impl Handler<S, X>,
    ) -> Result<Self, Error> {
        let route = Route {
            name: format!("{method} {path}").into(),
            handler: handler.into_boxed_handler(),
        };
        match self.routes.entry(method).or_default().insert(path, route) {
            Ok(()) => Ok(self),
            Err(matchit::InsertError::Conflict { .. }) => {
                Err(Error::DuplicateRoute { method, path: path.to_owned() })
            }
            Err(source) => Err(Error::InvalidRoute { path: path.to_owned(), source }),
        }
    }

    /// The shared state bundle, as handlers receive it.
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.state)
    }

    fn lookup(&self, method: Method, path: &str) -> Option<Route<S>> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        Some(matched.value.clone())
    }

    /// Routes one request to its handler and produces the response.
    ///
    /// The full per-request pipeline:
    ///
    /// 1. exact (method, path) lookup — a miss is a `404` with **no** side
    ///    effects: no span is opened, no handler or collaborator runs;
    /// 2. a request span named after the route opens; its context is what
    ///    the handler receives, so every collaborator span nests under it;
    /// 3. for typed routes the binder runs inside the erased handler — bind
    ///    failures come back as errors without the handler body running;
    /// 4. errors are mapped to status codes here and never escape: dispatch
    ///    always returns a [`Reply`].
    ///
    /// The request span is finished by its guard on every exit path,
    /// including cancellation of the future returned by this method.
    pub async fn dispatch(&self, envelope: Envelope) -> Reply {
        let Some(route) = self.lookup(envelope.method(), envelope.path()) else {
            let err = Error::RouteNotFound {
                method: envelope.method(),
                path: envelope.path().to_owned(),
            };
            debug!("{err}");
            return Reply::from_error(&err);
        };

        let (mut span, trace) = self.tracer.root().start_span(route.name.as_ref());
        span.set_tag("http.method", envelope.method().as_str());
        span.set_tag("http.path", envelope.path());

        let cx = RequestContext::new(trace);
        match route.handler.call(cx, Arc::clone(&self.state), envelope).await {
            Ok(reply) => {
                span.set_tag("http.status", reply.status_code().as_str());
                reply
            }
            Err(err) => {
                let reply = Reply::from_error(&err);
                span.set_tag("http.status", reply.status_code().as_str());
                span.set_tag("error", err.to_string());
                warn!(route = %route.name, "handler failed: {err}");
                reply
            }
        }
    }
}
