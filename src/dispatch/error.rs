//! Request-scoped error taxonomy.
//!
//! Errors are raised where a failure is detected and converted into a
//! (message, status) pair exactly once, at the dispatch boundary.

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::Environment;

/// A request failure carrying the message shown to the client and its status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Malformed body or unreadable request line.
    #[error("{0}")]
    BadRequest(String),

    /// Gated operation called without credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Method outside the global set, the route's allowed methods, or the
    /// handler's operations.
    #[error("{0}")]
    MethodNotAllowed(String),

    /// No route for the path, or no implementation for the routed handler.
    #[error("{0}")]
    NotFound(String),

    /// Raised by a handler with an explicit status.
    #[error("{message}")]
    Status { status: StatusCode, message: String },
}

impl RequestError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::MethodNotAllowed(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn with_status(status: StatusCode, msg: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: msg.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RequestError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            RequestError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::Status { status, .. } => *status,
        }
    }

    /// The message as written at the failure site.
    pub fn message(&self) -> &str {
        match self {
            RequestError::BadRequest(m)
            | RequestError::Unauthorized(m)
            | RequestError::MethodNotAllowed(m)
            | RequestError::NotFound(m) => m,
            RequestError::Status { message, .. } => message,
        }
    }

    /// The message sent to the client. Production mode drops route and
    /// handler detail from routing failures.
    pub fn public_message(&self, environment: Environment) -> String {
        match self {
            RequestError::NotFound(_) | RequestError::MethodNotAllowed(_)
                if environment.is_production() =>
            {
                reason(self.status()).to_string()
            }
            _ => self.message().to_string(),
        }
    }

    /// Consume the error into the pair written to the transport.
    pub fn into_parts(self, environment: Environment) -> (String, StatusCode) {
        (self.public_message(environment), self.status())
    }
}

/// Canonical reason phrase, or an empty string for unregistered codes.
pub fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

/// Status line as written by the hosting gateway, e.g. `404 Not Found`.
pub fn status_line(status: StatusCode) -> String {
    format!("{} {}", status.as_u16(), reason(status))
        .trim_end()
        .to_string()
}

/// Result type used across the pipeline.
pub type RequestResult<T> = Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RequestError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(RequestError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            RequestError::method_not_allowed("x").status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(RequestError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RequestError::with_status(StatusCode::CONFLICT, "taken").status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_production_hides_routing_detail() {
        let err = RequestError::not_found("No route for /secret/admin");
        assert_eq!(err.public_message(Environment::Production), "Not Found");
        assert_eq!(
            err.public_message(Environment::Development),
            "No route for /secret/admin"
        );

        let err = RequestError::method_not_allowed("Method is not allowed for path /zz");
        assert_eq!(err.public_message(Environment::Production), "Method Not Allowed");
    }

    #[test]
    fn test_production_keeps_client_errors() {
        let err = RequestError::bad_request("Malformed JSON body");
        assert_eq!(err.public_message(Environment::Production), "Malformed JSON body");

        let (message, status) =
            RequestError::unauthorized("Authorization required").into_parts(Environment::Production);
        assert_eq!(message, "Authorization required");
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(StatusCode::OK), "200 OK");
        assert_eq!(status_line(StatusCode::METHOD_NOT_ALLOWED), "405 Method Not Allowed");
        assert_eq!(status_line(StatusCode::from_u16(299).unwrap()), "299");
    }
}
