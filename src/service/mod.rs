//! The greeting service: routes, request types, and the layered
//! collaborators behind them.
//!
//! This is the application the framework half of the crate exists to serve.
//! Three toy routes sit on top of a two-layer backend: the greet handler
//! queries the [`Database`] and sends a confirmation through the
//! [`EmailServer`], which in turn calls its [`EmailVendor`] — each layer
//! opening a child span under the span handed to it, so one request yields
//! one correctly nested span tree.
//!
//! Collaborators are constructed once at startup, bundled into an
//! [`AppContext`], and injected through the router's state — nothing here
//! lives in a global.

pub mod database;
pub mod email;
mod handlers;

pub use database::Database;
pub use email::{EmailServer, EmailVendor};

use std::time::Duration;

use serde::Deserialize;

use crate::bind::{Bind, rules};
use crate::error::Error;
use crate::health;
use crate::method::Method;
use crate::router::Router;
use crate::trace::Tracer;

/// The dependency bundle handlers receive. Built once in `main`, owned by
/// the router for the life of the process.
pub struct AppContext {
    pub db: Database,
    pub email: EmailServer,
}

impl AppContext {
    /// Wires the collaborator chain. `latency` is how long each simulated
    /// backend call takes; tests pass `Duration::ZERO`.
    pub fn new(latency: Duration) -> Self {
        Self {
            db: Database::new(latency),
            email: EmailServer::new(EmailVendor::new(latency), latency),
        }
    }
}

/// The request body of `POST /greet`.
#[derive(Debug, Deserialize)]
pub struct Greeting {
    pub name: String,
    pub age: i64,
}

impl Bind for Greeting {
    fn validate(&self) -> Result<(), Error> {
        rules::numeric("age", self.age)?;
        rules::gt("age", self.age, 10)?;
        Ok(())
    }
}

/// Builds the full route table over `ctx`.
pub fn routes(ctx: AppContext, tracer: Tracer) -> Result<Router<AppContext>, Error> {
    Router::new(ctx, tracer)
        .on(Method::Get, "/time", handlers::time)?
        .on(Method::Get, "/hello", handlers::hello)?
        .on(Method::Post, "/greet", handlers::greet)?
        .on(Method::Get, "/healthz", health::liveness)?
        .on(Method::Get, "/readyz", health::readiness)
}

/// A random alphanumeric token, used for query names and message ids.
pub(crate) fn token(len: usize) -> String {
    (0..len).map(|_| fastrand::alphanumeric()).collect()
}

/// Stands in for a real backend round-trip: a cancellable async sleep.
/// Dropping the caller mid-sleep unwinds through its span guard, so the
/// span still finishes.
pub(crate) async fn simulate_io(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}
