//! Span-tree correctness through the full dispatch path.
//!
//! One request must yield one tree: request span at the root, one child per
//! collaborator call, and the email vendor strictly under the email server.
//! Concurrent requests must yield disjoint trees.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use arbor::service::{self, AppContext};
use arbor::trace::{Collector, Span, Tracer};
use arbor::{Envelope, Router, StatusCode};

fn greeting_app(latency: Duration) -> (Router<AppContext>, Collector) {
    let collector = Collector::new();
    let tracer = Tracer::new(collector.clone());
    let router =
        service::routes(AppContext::new(latency), tracer).expect("route table builds");
    (router, collector)
}

fn find<'a>(spans: &'a [Span], operation: &str) -> &'a Span {
    spans
        .iter()
        .find(|s| s.operation() == operation)
        .unwrap_or_else(|| panic!("no `{operation}` span exported"))
}

#[tokio::test]
async fn greet_produces_one_correctly_nested_tree() {
    let (app, collector) = greeting_app(Duration::ZERO);

    let reply = app
        .dispatch(Envelope::post_json("/greet", r#"{"name":"Ada","age":30}"#))
        .await;
    assert_eq!(reply.status_code(), StatusCode::OK);

    let spans = collector.finished();
    assert_eq!(spans.len(), 4, "request + query + server + vendor");

    let request = find(&spans, "POST /greet");
    let query = find(&spans, "PerformQuery");
    let server = find(&spans, "SendEmail");
    let vendor = find(&spans, "VendorSendEmail");

    // The request span is the root; both collaborators hang off it.
    assert_eq!(request.parent(), None);
    assert_eq!(query.parent(), Some(request.id()));
    assert_eq!(server.parent(), Some(request.id()));

    // The vendor nests under the server span — never a sibling of it.
    assert_eq!(vendor.parent(), Some(server.id()));

    for span in &spans {
        assert!(span.finished_at().is_some(), "unfinished span: {}", span.operation());
    }

    assert_eq!(request.tag("http.method"), Some("POST"));
    assert_eq!(request.tag("http.status"), Some("200"));
    assert_eq!(server.tag("recipient"), Some("Ada@example.com"));
}

#[tokio::test]
async fn rejected_request_still_finishes_its_request_span() {
    let (app, collector) = greeting_app(Duration::ZERO);

    let reply = app
        .dispatch(Envelope::post_json("/greet", r#"{"name":"Ada","age":3}"#))
        .await;
    assert_eq!(reply.status_code(), StatusCode::BAD_REQUEST);

    // Binding failed before the handler ran: no collaborator spans, but the
    // request span itself is finished and tagged with the failure.
    let spans = collector.finished();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].operation(), "POST /greet");
    assert_eq!(spans[0].tag("http.status"), Some("400"));
    assert!(spans[0].finished_at().is_some());
}

#[tokio::test]
async fn cancelled_request_leaks_no_unfinished_span() {
    // Long enough that the database layer is guaranteed to be mid-sleep when
    // the timeout fires.
    let (app, collector) = greeting_app(Duration::from_secs(30));

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        app.dispatch(Envelope::post_json("/greet", r#"{"name":"Ada","age":30}"#)),
    )
    .await;
    assert!(outcome.is_err(), "dispatch must still be in flight at the timeout");

    // Dropping the dispatch future unwound the guards: whatever was started
    // — the request span and the in-flight query — is finished and exported.
    let spans = collector.finished();
    let ops: HashSet<_> = spans.iter().map(|s| s.operation().to_owned()).collect();
    assert_eq!(
        ops,
        HashSet::from(["POST /greet".to_owned(), "PerformQuery".to_owned()])
    );
    for span in &spans {
        assert!(span.finished_at().is_some(), "unfinished span: {}", span.operation());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_greets_produce_disjoint_trees() {
    let (app, collector) = greeting_app(Duration::ZERO);
    let app = Arc::new(app);

    let names: Vec<String> = (0..16).map(|i| format!("user{i}")).collect();

    let mut tasks = tokio::task::JoinSet::new();
    for name in &names {
        let app = Arc::clone(&app);
        let body = format!(r#"{{"name":"{name}","age":30}}"#);
        tasks.spawn(async move {
            let reply = app.dispatch(Envelope::post_json("/greet", body)).await;
            assert_eq!(reply.status_code(), StatusCode::OK);
        });
    }
    while let Some(res) = tasks.join_next().await {
        res.expect("request task panicked");
    }

    let spans = collector.finished();
    assert_eq!(spans.len(), names.len() * 4);

    // Reconstruct each request's tree by its recipient tag and check the
    // parent chain never crosses into another request's tree.
    let mut roots = HashSet::new();
    for name in &names {
        let recipient = format!("{name}@example.com");
        let server = spans
            .iter()
            .find(|s| s.operation() == "SendEmail" && s.tag("recipient") == Some(recipient.as_str()))
            .unwrap_or_else(|| panic!("no SendEmail span for {recipient}"));
        let vendor = spans
            .iter()
            .find(|s| {
                s.operation() == "VendorSendEmail" && s.tag("recipient") == Some(recipient.as_str())
            })
            .unwrap_or_else(|| panic!("no VendorSendEmail span for {recipient}"));

        assert_eq!(vendor.parent(), Some(server.id()));

        let root = spans
            .iter()
            .find(|s| Some(s.id()) == server.parent())
            .expect("server span parents to an exported span");
        assert_eq!(root.operation(), "POST /greet");
        assert_eq!(root.parent(), None);

        assert!(roots.insert(root.id()), "two requests shared a request span");
    }
    assert_eq!(roots.len(), names.len());
}
