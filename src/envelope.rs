//! The raw inbound request, as dispatch sees it.

use bytes::Bytes;

use crate::method::Method;

/// An inbound request reduced to what dispatch needs: method, path,
/// content type, and the fully collected body.
///
/// The server builds one per request from the hyper side; tests build them
/// directly and feed [`Router::dispatch`](crate::Router::dispatch) without a
/// socket in sight. An `Envelope` is consumed by exactly one dispatch and is
/// never persisted.
#[derive(Clone, Debug)]
pub struct Envelope {
    method: Method,
    path: String,
    content_type: Option<String>,
    body: Bytes,
}

impl Envelope {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        content_type: Option<String>,
        body: Bytes,
    ) -> Self {
        Self { method, path: path.into(), content_type, body }
    }

    /// A bodyless GET — the common case in tests.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None, Bytes::new())
    }

    /// A POST carrying a JSON body.
    pub fn post_json(path: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self::new(
            Method::Post,
            path,
            Some("application/json".to_owned()),
            body.into(),
        )
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
