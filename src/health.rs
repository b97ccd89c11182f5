//! Built-in health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it serve traffic? Failure → pulled from the load-balancer. |
//!
//! Register them on your router:
//!
//! ```rust,no_run
//! use arbor::{health, Error, Method, Router};
//! use arbor::trace::{LogSink, Tracer};
//!
//! # fn main() -> Result<(), Error> {
//! let app = Router::new((), Tracer::new(LogSink))
//!     .on(Method::Get, "/healthz", health::liveness)?
//!     .on(Method::Get, "/readyz", health::readiness)?;
//! # Ok(())
//! # }
//! ```
//!
//! Override `readiness` with your own handler to gate on dependency
//! availability (database connections, downstream services).

use std::sync::Arc;

use http::StatusCode;

use crate::context::RequestContext;
use crate::error::Error;
use crate::reply::Reply;

/// Liveness probe handler.
///
/// Always `200 OK` with body `"ok"`. If the process can respond to HTTP at
/// all, it is alive — this handler intentionally has no dependencies.
pub async fn liveness<S>(_cx: RequestContext, _state: Arc<S>) -> Result<Reply, Error> {
    Ok(Reply::text(StatusCode::OK, "ok"))
}

/// Readiness probe handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace with your own handler if
/// your application needs a warm-up period or must verify dependency health
/// before accepting traffic.
pub async fn readiness<S>(_cx: RequestContext, _state: Arc<S>) -> Result<Reply, Error> {
    Ok(Reply::text(StatusCode::OK, "ready"))
}
