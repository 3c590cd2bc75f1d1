//! Handler descriptors.
//!
//! A handler is a named unit (`namespace.name`) exposing one operation per
//! HTTP method. Handlers are registered in code at startup; the route table
//! refers to them by id.

pub mod registry;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::dispatch::error::RequestResult;
use crate::http::request::Request;
use crate::http::response::Response;

pub use registry::{HandlerRegistry, RegistryError};

/// A single handler operation.
pub type Operation = Arc<dyn Fn(&Request) -> RequestResult<Response> + Send + Sync>;

/// Wrap a closure returning anything convertible to a [`Response`].
pub fn operation<F, R>(f: F) -> Operation
where
    F: Fn(&Request) -> RequestResult<R> + Send + Sync + 'static,
    R: Into<Response>,
{
    Arc::new(move |req: &Request| -> RequestResult<Response> { f(req).map(Into::into) })
}

/// Split `posts.index` into `("posts", "index")`.
pub fn split_handler_id(id: &str) -> Option<(&str, &str)> {
    let (namespace, name) = id.split_once('.')?;
    let valid = |part: &str| {
        !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c == '/')
    };
    (valid(namespace) && valid(name)).then_some((namespace, name))
}

/// A named handler and its per-method operations.
#[derive(Clone)]
pub struct Handler {
    id: String,
    operations: HashMap<Method, Operation>,
}

impl Handler {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operations: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register an already-built operation, e.g. one wrapped by a gate.
    pub fn on(mut self, method: Method, op: Operation) -> Self {
        self.operations.insert(method, op);
        self
    }

    pub fn get<F, R>(self, f: F) -> Self
    where
        F: Fn(&Request) -> RequestResult<R> + Send + Sync + 'static,
        R: Into<Response>,
    {
        self.on(Method::GET, operation(f))
    }

    pub fn post<F, R>(self, f: F) -> Self
    where
        F: Fn(&Request) -> RequestResult<R> + Send + Sync + 'static,
        R: Into<Response>,
    {
        self.on(Method::POST, operation(f))
    }

    pub fn put<F, R>(self, f: F) -> Self
    where
        F: Fn(&Request) -> RequestResult<R> + Send + Sync + 'static,
        R: Into<Response>,
    {
        self.on(Method::PUT, operation(f))
    }

    pub fn delete<F, R>(self, f: F) -> Self
    where
        F: Fn(&Request) -> RequestResult<R> + Send + Sync + 'static,
        R: Into<Response>,
    {
        self.on(Method::DELETE, operation(f))
    }

    pub fn patch<F, R>(self, f: F) -> Self
    where
        F: Fn(&Request) -> RequestResult<R> + Send + Sync + 'static,
        R: Into<Response>,
    {
        self.on(Method::PATCH, operation(f))
    }

    pub fn options<F, R>(self, f: F) -> Self
    where
        F: Fn(&Request) -> RequestResult<R> + Send + Sync + 'static,
        R: Into<Response>,
    {
        self.on(Method::OPTIONS, operation(f))
    }

    /// The operation registered for `method`, if any.
    pub fn operation(&self, method: &Method) -> Option<&Operation> {
        self.operations.get(method)
    }

    /// Lowercase names of the implemented operations, sorted.
    pub fn operation_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .operations
            .keys()
            .map(|m| m.as_str().to_ascii_lowercase())
            .collect();
        names.sort();
        names
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .field("operations", &self.operation_names())
            .finish()
    }
}
