//! The greeting service binary.
//!
//! Configuration comes from the process environment:
//!
//! - `LISTEN_ADDR` — bind address, default `0.0.0.0:3000`
//! - `BACKEND_LATENCY_MS` — simulated backend latency per layer call,
//!   default `250`
//! - `RUST_LOG` — log filter, default `info`
//!
//! Try:
//!   curl http://localhost:3000/time
//!   curl http://localhost:3000/hello
//!   curl -X POST http://localhost:3000/greet \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"Ada","age":30}'

use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use arbor::Server;
use arbor::service::{self, AppContext};
use arbor::trace::{LogSink, Tracer};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
    let latency_ms: u64 = std::env::var("BACKEND_LATENCY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(250);

    let tracer = Tracer::new(LogSink);
    let ctx = AppContext::new(Duration::from_millis(latency_ms));

    // Route registration failures are startup-fatal: a duplicate route is a
    // programming error, not something to limp past.
    let app = match service::routes(ctx, tracer) {
        Ok(app) => app,
        Err(err) => {
            error!("unable to build route table: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = Server::bind(&addr).serve(app).await {
        error!("server terminated in error: {err}");
        std::process::exit(1);
    }

    info!("server terminated successfully");
}
