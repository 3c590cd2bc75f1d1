//! Request dispatch.
//!
//! # Responsibilities
//! - Run one call through normalize → resolve → method checks → operation
//! - Convert every `RequestError` into a response at a single boundary
//! - Encode the result for the transport
//!
//! # Design Decisions
//! - Route table and registry are built before the first call and only read
//!   afterwards, so calls share them without locks
//! - Each call is synchronous and isolated: a failed call leaves nothing
//!   behind for the next one

use std::iter;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{AppConfig, Environment};
use crate::dispatch::error::{RequestError, RequestResult};
use crate::handler::{HandlerRegistry, RegistryError};
use crate::http::request::{is_global_method, normalize, RawRequest, Request};
use crate::http::response::{EncodedResponse, Response};
use crate::observability::metrics;
use crate::routing::{build_route_table, resolve, RouteTable};

/// The dispatch pipeline. Cheap to clone; clones share the route table and
/// registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
    registry: Arc<HandlerRegistry>,
    environment: Environment,
}

impl Dispatcher {
    /// Create a dispatcher, refusing routes that name unregistered handlers.
    pub fn new(
        table: RouteTable,
        registry: HandlerRegistry,
        environment: Environment,
    ) -> Result<Self, RegistryError> {
        registry.check_routes(&table)?;
        Ok(Self::unchecked(table, registry, environment))
    }

    /// Create a dispatcher without checking handler registration. Routes to
    /// unregistered handlers answer 404 at request time.
    pub fn unchecked(table: RouteTable, registry: HandlerRegistry, environment: Environment) -> Self {
        Self {
            table: Arc::new(table),
            registry: Arc::new(registry),
            environment,
        }
    }

    /// Build the route table from config and check it against the registry.
    /// With `routes.strict = false` unresolved routes are only logged.
    pub fn from_config(config: &AppConfig, registry: HandlerRegistry) -> Result<Self, RegistryError> {
        let table = build_route_table(&config.routes, &registry);
        table.log_routes();
        metrics::record_routes(table.len());

        if config.routes.strict {
            return Self::new(table, registry, config.environment);
        }
        for route in registry.unresolved_routes(&table) {
            tracing::warn!(route = %route, "Route references an unregistered handler");
        }
        Ok(Self::unchecked(table, registry, config.environment))
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Resolve a normalized request and run the matching operation.
    pub fn dispatch(&self, request: &mut Request) -> RequestResult<Response> {
        let resolved = resolve(&self.table, &self.registry, request)?;

        if !is_global_method(&request.method) {
            return Err(RequestError::method_not_allowed(format!(
                "The method {} does not exist.",
                request.method
            )));
        }

        if !resolved.route.allows(&request.method) {
            return Err(RequestError::method_not_allowed(format!(
                "Method is not allowed for path {}",
                request.path
            )));
        }

        let operation = resolved.handler.operation(&request.method).ok_or_else(|| {
            RequestError::method_not_allowed(format!(
                "Method {} not found in {}",
                request.method,
                resolved.handler.id()
            ))
        })?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            handler = %resolved.handler.id(),
            "Dispatching"
        );
        operation(request)
    }

    /// Run one call end to end. Never fails: errors become responses here.
    pub fn handle(&self, raw: RawRequest) -> EncodedResponse {
        let start = Instant::now();
        let method = raw.method.clone();
        let path = raw.path.clone();

        let outcome = normalize(raw).and_then(|mut request| self.dispatch(&mut request));
        let encoded = match outcome {
            Ok(response) => response.encode(),
            Err(err) => self.error_response(&method, &path, err),
        };

        metrics::record_request(&method, encoded.status.as_u16(), start);
        tracing::info!(
            method = %method,
            path = %path,
            status = encoded.status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
        encoded
    }

    /// Gateway-style entry point: report status line and headers through
    /// `start_response`, return the body chunks.
    pub fn call<F>(&self, raw: RawRequest, start_response: F) -> iter::Once<Vec<u8>>
    where
        F: FnOnce(&str, &[(String, String)]),
    {
        let encoded = self.handle(raw);
        start_response(&encoded.status_line(), &encoded.headers);
        iter::once(encoded.body)
    }

    fn error_response(&self, method: &str, path: &str, err: RequestError) -> EncodedResponse {
        let status = err.status();
        if status.is_server_error() {
            tracing::error!(method = %method, path = %path, status = status.as_u16(), error = %err, "Request failed");
        } else {
            tracing::warn!(method = %method, path = %path, status = status.as_u16(), error = %err, "Request rejected");
        }

        let (message, status) = err.into_parts(self.environment);
        Response::text(message).with_status(status).encode()
    }
}
