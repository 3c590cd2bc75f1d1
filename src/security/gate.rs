//! Per-operation authentication gate.
//!
//! Wraps a single handler operation. The wrapped operation only runs when the
//! request carries a non-blank Authorization value; otherwise the gate
//! answers 401 itself.

use std::sync::Arc;

use crate::dispatch::error::{RequestError, RequestResult};
use crate::handler::Operation;
use crate::http::request::Request;
use crate::http::response::Response;

/// Require credentials before running `op`.
pub fn authenticated(op: Operation) -> Operation {
    Arc::new(move |req: &Request| -> RequestResult<Response> {
        require_credentials(req)?;
        op(req)
    })
}

/// The pre-check performed by [`authenticated`].
pub fn require_credentials(req: &Request) -> RequestResult<&str> {
    req.credentials().ok_or_else(|| {
        tracing::warn!(path = %req.path, method = %req.method, "Missing authorization");
        RequestError::unauthorized("Authorization required.")
    })
}
