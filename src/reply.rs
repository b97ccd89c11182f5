//! Outgoing response type.
//!
//! One contract for every handler: you return a [`Reply`] with an explicit
//! status, or an [`Error`](crate::Error) that dispatch maps to one. There is
//! no implicit 200 and no second return shape.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;

use crate::error::Error;

/// An outgoing response: status, content type, body.
///
/// ```rust
/// use arbor::Reply;
/// use http::StatusCode;
///
/// # #[derive(serde::Serialize)] struct User { id: u32 }
/// Reply::json(StatusCode::OK, &User { id: 1 })?;
/// Reply::text(StatusCode::OK, "ready");
/// Reply::status(StatusCode::NO_CONTENT);
/// # Ok::<(), arbor::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Reply {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Vec<u8>,
}

impl Reply {
    /// A JSON reply. Serialization happens here, in the typed world — the
    /// dispatch boundary only ever moves bytes.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self { status, content_type: Some("application/json"), body })
    }

    /// A plain-text reply (`text/plain; charset=utf-8`).
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/plain; charset=utf-8"),
            body: body.into().into_bytes(),
        }
    }

    /// A bodyless reply.
    pub fn status(status: StatusCode) -> Self {
        Self { status, content_type: None, body: Vec::new() }
    }

    /// The error reply dispatch produces at the boundary: the mapped status
    /// plus a JSON `{"error": "..."}` body.
    pub(crate) fn from_error(err: &Error) -> Self {
        #[derive(Serialize)]
        struct Body {
            error: String,
        }
        let body = Body { error: err.public_message() };
        // Serializing two strings cannot fail; fall back to bare status anyway.
        Self::json(err.status(), &body).unwrap_or_else(|_| Self::status(err.status()))
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The hyper edge: a `Reply` becomes an `http::Response` exactly once,
    /// when the server writes it out.
    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status);
        if let Some(ct) = self.content_type {
            builder = builder.header(http::header::CONTENT_TYPE, ct);
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .expect("statically valid response parts")
    }
}
