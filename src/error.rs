//! Unified error type and its HTTP mapping.

use http::StatusCode;
use thiserror::Error;

use crate::method::Method;

/// The error type for everything that can go wrong in arbor.
///
/// Registration errors (`DuplicateRoute`, `InvalidRoute`) are startup-fatal:
/// they surface from [`Router::on`](crate::Router::on) before the server ever
/// binds a socket. Everything else is per-request and is mapped to a status
/// code at the dispatch boundary — a failing request never takes the process
/// down and never affects its neighbours.
#[derive(Debug, Error)]
pub enum Error {
    /// A (method, path) pair was registered twice.
    #[error("route {method} {path} is already registered")]
    DuplicateRoute { method: Method, path: String },

    /// The route pattern itself was rejected by the route tree.
    #[error("invalid route `{path}`: {source}")]
    InvalidRoute {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    /// No handler registered for this (method, path) pair.
    #[error("no route for {method} {path}")]
    RouteNotFound { method: Method, path: String },

    /// The request body could not be parsed into the route's declared type.
    #[error("malformed request body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A declared validation rule rejected a decoded field.
    #[error("field `{field}` failed rule `{rule}`")]
    Validation { field: &'static str, rule: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A handler failed for reasons of its own.
    #[error("internal: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps an arbitrary handler failure. Maps to `500` at the boundary.
    pub fn internal(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Internal(err.into())
    }

    /// The status code this error maps to at the dispatch boundary.
    ///
    /// Registration errors never reach dispatch; if one somehow does, it is
    /// a server bug and reported as such.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Decode(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::DuplicateRoute { .. }
            | Self::InvalidRoute { .. }
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message exposed in the response body.
    ///
    /// Client errors carry their real message — the caller needs to know
    /// which field failed which rule. Server errors are flattened to a
    /// constant so internals never leak across the boundary.
    pub(crate) fn public_message(&self) -> String {
        if self.status().is_server_error() {
            "internal server error".to_owned()
        } else {
            self.to_string()
        }
    }
}
