//! Route handlers for the greeting service.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use http::StatusCode;
use serde::Serialize;

use crate::context::RequestContext;
use crate::error::Error;
use crate::reply::Reply;

use super::{AppContext, Greeting, token};

/// `GET /time` — the current UTC time, RFC 3339, plain text.
pub async fn time(_cx: RequestContext, _app: Arc<AppContext>) -> Result<Reply, Error> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    Ok(Reply::text(StatusCode::OK, now))
}

/// `GET /hello` — a JSON string, nothing else.
pub async fn hello(_cx: RequestContext, _app: Arc<AppContext>) -> Result<Reply, Error> {
    Reply::json(StatusCode::OK, &"Hello World!")
}

#[derive(Serialize)]
struct GreetReply {
    #[serde(rename = "Message")]
    message: String,
}

/// `POST /greet` — greets a validated [`Greeting`], exercising the full
/// backend chain: one database query, one email through the vendor.
pub async fn greet(
    cx: RequestContext,
    app: Arc<AppContext>,
    greeting: Greeting,
) -> Result<Reply, Error> {
    app.db.perform_query(cx.trace(), &token(12)).await;

    let recipient = format!("{}@example.com", greeting.name);
    let message = format!("Hello {}!", greeting.name);
    app.email.send_email(cx.trace(), &recipient, &message).await?;

    Reply::json(StatusCode::OK, &GreetReply { message })
}
