//! Response values and encoding.
//!
//! # Responsibilities
//! - Carry handler output with optional status, content-type and header
//!   overrides
//! - Encode the payload into bytes with a matching content type
//! - Compute Content-Length and default the CORS header
//!
//! # Design Decisions
//! - Objects and arrays are JSON; every other value is plain text
//! - A content type chosen by the handler always wins
//! - Content-Length is the encoded byte length, never the character count

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::error::status_line;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const ANY_ORIGIN: &str = "*";

/// Handler output.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub body: Value,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl Response {
    pub fn new(body: impl Into<Value>) -> Self {
        Self {
            body: body.into(),
            status: StatusCode::OK,
            content_type: None,
            headers: Vec::new(),
        }
    }

    /// Build a response from any serializable value.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_value(value)?))
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::new(Value::String(body.into()))
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Encode into transport form.
    pub fn encode(self) -> EncodedResponse {
        let (bytes, default_type) = match self.body {
            body @ (Value::Object(_) | Value::Array(_)) => {
                (body.to_string().into_bytes(), JSON_CONTENT_TYPE)
            }
            Value::String(s) => (s.into_bytes(), TEXT_CONTENT_TYPE),
            Value::Null => (Vec::new(), TEXT_CONTENT_TYPE),
            other => (other.to_string().into_bytes(), TEXT_CONTENT_TYPE),
        };
        let content_type = self
            .content_type
            .unwrap_or_else(|| default_type.to_string());

        let mut headers = vec![
            (CONTENT_TYPE.to_string(), content_type),
            (CONTENT_LENGTH.to_string(), bytes.len().to_string()),
            (ALLOW_ORIGIN.to_string(), ANY_ORIGIN.to_string()),
        ];
        for (name, value) in self.headers {
            // Content-Length is always ours.
            if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                continue;
            }
            match headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
                Some(existing) => existing.1 = value,
                None => headers.push((name, value)),
            }
        }

        EncodedResponse {
            status: self.status,
            headers,
            body: bytes,
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

impl From<Value> for Response {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}

impl From<&str> for Response {
    fn from(body: &str) -> Self {
        Self::text(body)
    }
}

impl From<String> for Response {
    fn from(body: String) -> Self {
        Self::text(body)
    }
}

impl<T: Into<Value>> From<(T, StatusCode)> for Response {
    fn from((body, status): (T, StatusCode)) -> Self {
        Self::new(body).with_status(status)
    }
}

/// Response ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl EncodedResponse {
    /// Status line, e.g. `200 OK`.
    pub fn status_line(&self) -> String {
        status_line(self.status)
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as UTF-8 text, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
