//! # arbor
//!
//! A minimal HTTP service kit built around two ideas:
//!
//! - **Typed dispatch** — a route either declares no request type, or it
//!   declares one and its handler receives the decoded, validated value by
//!   value. Input that fails decoding or a declared rule is answered with
//!   `400` before the handler body runs. No `any`, no downcasts.
//! - **Explicit trace propagation** — every dispatched request opens a span;
//!   every layer a handler calls opens a child span from the context it is
//!   handed, and passes a derived context further down. Span trees mirror
//!   call trees because the carrier is a plain value threaded through plain
//!   arguments — there is no ambient magic to get subtly wrong.
//!
//! Handlers all share one contract: explicit status in, [`Reply`] or
//! [`Error`] out. Errors are mapped to status codes at the dispatch
//! boundary and never take the process down.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use arbor::trace::{LogSink, Tracer};
//! use arbor::{Error, Method, Reply, RequestContext, Router, Server, StatusCode};
//!
//! struct App;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let app = Router::new(App, Tracer::new(LogSink))
//!         .on(Method::Get, "/ping", ping)?;
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn ping(_cx: RequestContext, _app: Arc<App>) -> Result<Reply, Error> {
//!     Ok(Reply::text(StatusCode::OK, "pong"))
//! }
//! ```

mod bind;
mod context;
mod envelope;
mod error;
pub mod handler;
mod method;
mod reply;
mod router;
mod server;

pub mod health;
pub mod service;
pub mod trace;

pub use bind::{Bind, rules};
pub use context::RequestContext;
pub use envelope::Envelope;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use reply::Reply;
pub use router::Router;
pub use server::Server;

/// Re-exported for handler signatures — every [`Reply`] takes one.
pub use http::StatusCode;
