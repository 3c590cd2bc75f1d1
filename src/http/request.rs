//! Request normalization.
//!
//! # Responsibilities
//! - Accept raw transport metadata from the hosting gateway
//! - Validate the method token
//! - Extract routing-relevant information (path, query, header subset)
//! - Parse bodies of mutating methods by content type
//!
//! # Design Decisions
//! - Only POST, PUT, PATCH and DELETE bodies are parsed
//! - Malformed JSON is a client error, never a pipeline failure
//! - Unknown media types yield an empty body rather than an error
//! - A fresh `Request` is built per call; nothing is shared between calls

use std::collections::HashMap;

use axum::http::Method;
use serde_json::{Map, Value};

use crate::dispatch::error::{RequestError, RequestResult};

/// Methods the pipeline recognizes.
pub const GLOBAL_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
];

const JSON_MEDIA_TYPE: &str = "application/json";
const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Multi-value parameter map used for query strings and form bodies.
pub type Params = HashMap<String, Vec<String>>;

/// Returns true if the method is in the global method set.
pub fn is_global_method(method: &Method) -> bool {
    GLOBAL_METHODS.contains(method)
}

/// Case-insensitive check of a method name against the global method set.
pub fn is_global_method_name(name: &str) -> bool {
    Method::from_bytes(name.trim().to_ascii_uppercase().as_bytes())
        .map(|m| is_global_method(&m))
        .unwrap_or(false)
}

/// Raw request metadata handed over by the hosting gateway.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub method: String,
    pub path: String,
    pub query_string: String,
    pub accept: Option<String>,
    pub user_agent: Option<String>,
    pub cookie: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub server_name: Option<String>,
    pub server_port: Option<u16>,
    pub body: Vec<u8>,
}

impl RawRequest {
    /// Create a raw request. A query string embedded in `target` is split off.
    pub fn new(method: impl Into<String>, target: impl AsRef<str>) -> Self {
        let target = target.as_ref();
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self {
            method: method.into(),
            path: path.to_string(),
            query_string: query.to_string(),
            ..Default::default()
        }
    }

    /// Record a header. Headers outside the subset the pipeline reads are
    /// ignored.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match name.to_ascii_lowercase().as_str() {
            "accept" => self.accept = Some(value),
            "user-agent" => self.user_agent = Some(value),
            "cookie" => self.cookie = Some(value),
            "authorization" => self.authorization = Some(value),
            "content-type" => self.content_type = Some(value),
            _ => {}
        }
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Parsed request body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    Empty,
    /// `application/json` object.
    Json(Map<String, Value>),
    /// `application/x-www-form-urlencoded` fields.
    Form(Params),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Json(map) => map.is_empty(),
            Body::Form(params) => params.is_empty(),
        }
    }

    /// String value of a field. For form bodies, the first value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self {
            Body::Empty => None,
            Body::Json(map) => map.get(key).and_then(Value::as_str),
            Body::Form(params) => params.get(key).and_then(|v| v.first()).map(String::as_str),
        }
    }

    pub fn as_json(&self) -> Option<&Map<String, Value>> {
        match self {
            Body::Json(map) => Some(map),
            _ => None,
        }
    }
}

/// A normalized request, owned by a single pipeline call.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Route table key the request matched. Equal to `raw_path` until the
    /// request is resolved.
    pub path: String,
    pub raw_path: String,
    pub query_string: String,
    pub query: Params,
    pub accept: Option<String>,
    pub user_agent: Option<String>,
    pub cookies: HashMap<String, String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub server_name: Option<String>,
    pub server_port: Option<u16>,
    pub body: Body,
}

impl Request {
    /// First value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// Returns true if the Accept header mentions `needle`.
    pub fn accepts(&self, needle: &str) -> bool {
        self.accept.as_deref().is_some_and(|a| a.contains(needle))
    }

    /// The authorization value, if present and not blank.
    pub fn credentials(&self) -> Option<&str> {
        self.authorization
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Build a [`Request`] from raw transport metadata.
pub fn normalize(raw: RawRequest) -> RequestResult<Request> {
    let method = Method::from_bytes(raw.method.trim().as_bytes())
        .map_err(|_| RequestError::bad_request("Request method is not understood."))?;

    let body = if is_mutating(&method) {
        parse_body(raw.content_type.as_deref(), &raw.body)?
    } else {
        Body::Empty
    };

    let path = if raw.path.is_empty() {
        "/".to_string()
    } else {
        raw.path
    };

    Ok(Request {
        method,
        path: path.clone(),
        raw_path: path,
        query: decode_params(raw.query_string.as_bytes()),
        query_string: raw.query_string,
        accept: raw.accept,
        user_agent: raw.user_agent,
        cookies: raw.cookie.as_deref().map(parse_cookies).unwrap_or_default(),
        authorization: raw.authorization,
        content_type: raw.content_type,
        server_name: raw.server_name,
        server_port: raw.server_port,
        body,
    })
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Media type without parameters, lowercased.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn parse_body(content_type: Option<&str>, bytes: &[u8]) -> RequestResult<Body> {
    let Some(content_type) = content_type else {
        return Ok(Body::Empty);
    };

    match media_type(content_type).as_str() {
        JSON_MEDIA_TYPE => {
            if bytes.trim_ascii().is_empty() {
                return Ok(Body::Empty);
            }
            match serde_json::from_slice::<Value>(bytes) {
                Ok(Value::Object(map)) => Ok(Body::Json(map)),
                Ok(_) => Err(RequestError::bad_request("JSON body must be an object.")),
                Err(e) => Err(RequestError::bad_request(format!("Malformed JSON body: {}", e))),
            }
        }
        FORM_MEDIA_TYPE => Ok(Body::Form(decode_params(bytes))),
        _ => Ok(Body::Empty),
    }
}

/// Decode `a=1&a=2&b=x` into a multi-value map.
pub fn decode_params(bytes: &[u8]) -> Params {
    let mut params = Params::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}
