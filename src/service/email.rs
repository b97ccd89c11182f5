//! The email layers of the demo chain — the one two-hop call path.
//!
//! `EmailServer::send_email` opens its own span, then calls the vendor with
//! the context *derived from that span*. The vendor's span is therefore a
//! child of the server's span, which is a child of the handler's — three
//! levels, strictly nested, never siblings.

use std::time::Duration;

use crate::error::Error;
use crate::trace::TraceContext;

use super::{simulate_io, token};

/// The outer email layer: accepts a send request, hands it to the vendor.
pub struct EmailServer {
    vendor: EmailVendor,
    latency: Duration,
}

impl EmailServer {
    pub fn new(vendor: EmailVendor, latency: Duration) -> Self {
        Self { vendor, latency }
    }

    /// Sends `body` to `recipient` through the vendor; returns the vendor's
    /// message id.
    pub async fn send_email(
        &self,
        cx: &TraceContext,
        recipient: &str,
        body: &str,
    ) -> Result<String, Error> {
        let (mut span, vendor_cx) = cx.start_span("SendEmail");
        span.set_tag("recipient", recipient);

        simulate_io(self.latency).await;

        // The vendor gets the context derived from this span, not the one
        // this layer received — its span nests here.
        self.vendor.send_email(&vendor_cx, recipient, body).await
    }
}

/// The vendor behind the email server — the leaf of the chain.
pub struct EmailVendor {
    latency: Duration,
}

impl EmailVendor {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Performs the (simulated) delivery and returns a message id.
    pub async fn send_email(
        &self,
        cx: &TraceContext,
        recipient: &str,
        _body: &str,
    ) -> Result<String, Error> {
        let (mut span, _cx) = cx.start_span("VendorSendEmail");
        span.set_tag("recipient", recipient);

        simulate_io(self.latency).await;

        let message_id = token(16);
        span.set_tag("messageId", message_id.as_str());
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Collector, Tracer};

    fn chain() -> (EmailServer, Tracer, Collector) {
        let collector = Collector::new();
        let tracer = Tracer::new(collector.clone());
        let server = EmailServer::new(EmailVendor::new(Duration::ZERO), Duration::ZERO);
        (server, tracer, collector)
    }

    #[tokio::test]
    async fn vendor_span_nests_under_server_span() {
        let (server, tracer, collector) = chain();

        let (handler, cx) = tracer.root().start_span("handler");
        let handler_id = handler.id();
        server.send_email(&cx, "ada@example.com", "hi").await.unwrap();
        handler.finish();

        let spans = collector.finished();
        let server_span = spans.iter().find(|s| s.operation() == "SendEmail").unwrap();
        let vendor_span = spans.iter().find(|s| s.operation() == "VendorSendEmail").unwrap();

        assert_eq!(server_span.parent(), Some(handler_id));
        assert_eq!(vendor_span.parent(), Some(server_span.id()));
        assert_eq!(vendor_span.tag("recipient"), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn vendor_returns_a_message_id() {
        let (server, tracer, collector) = chain();

        let id = server
            .send_email(&tracer.root(), "ada@example.com", "hi")
            .await
            .unwrap();
        assert_eq!(id.len(), 16);

        let spans = collector.finished();
        let vendor_span = spans.iter().find(|s| s.operation() == "VendorSendEmail").unwrap();
        assert_eq!(vendor_span.tag("messageId"), Some(id.as_str()));
    }
}
