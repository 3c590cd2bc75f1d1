//! `new` namespace.

use axum::http::StatusCode;
use serde_json::json;

use crate::handler::{operation, Handler};
use crate::http::request::Request;
use crate::security::authenticated;

/// GET answers a list for clients that accept `new`, otherwise the caller's
/// user agent. POST requires credentials.
pub fn app() -> Handler {
    Handler::new("new.app")
        .get(|req: &Request| {
            if req.accepts("new") {
                Ok(json!(["Hello World", "200 OK"]))
            } else {
                Ok(json!({ "path": req.user_agent }))
            }
        })
        .on(
            axum::http::Method::POST,
            authenticated(operation(|_: &Request| Ok(("Hello World", StatusCode::OK)))),
        )
}
