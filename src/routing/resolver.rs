//! Route lookup and handler resolution.
//!
//! # Responsibilities
//! - Find the route for a request path (literal first, then canonical)
//! - Resolve the route's handler id to its implementation
//! - Report route misses and missing implementations as distinct errors
//!
//! # Design Decisions
//! - Literal match first so alias paths like `/legacy` are served verbatim
//! - Errors carry full detail; the dispatch boundary strips it in production

use std::sync::Arc;

use crate::dispatch::error::{RequestError, RequestResult};
use crate::handler::{Handler, HandlerRegistry};
use crate::http::request::Request;
use crate::routing::path::canonicalize;
use crate::routing::table::{RouteEntry, RouteTable};

/// A matched route and its handler.
#[derive(Debug, Clone)]
pub struct Resolved<'t> {
    pub route: &'t RouteEntry,
    pub handler: Arc<Handler>,
}

/// Find the route for `path`: the literal path if declared, else its
/// canonical form.
pub fn lookup<'t>(table: &'t RouteTable, path: &str) -> Option<&'t RouteEntry> {
    table.get(path).or_else(|| table.get(&canonicalize(path)))
}

/// Resolve a request to its route and handler. On success `request.path` is
/// set to the matched route path.
pub fn resolve<'t>(
    table: &'t RouteTable,
    registry: &HandlerRegistry,
    request: &mut Request,
) -> RequestResult<Resolved<'t>> {
    let Some(route) = lookup(table, &request.raw_path) else {
        return Err(RequestError::not_found(format!(
            "404 Not Found [{}]. No route matches '{}'; add a route entry for it under [routes] \
             (resources, tweaks.controller or tweaks.path).",
            request.raw_path,
            canonicalize(&request.raw_path),
        )));
    };
    request.path = route.path.clone();

    let handler = registry.get(&route.handler_id).ok_or_else(|| {
        RequestError::not_found(format!(
            "Handler {} not found for route {}.",
            route.handler_id, route.path
        ))
    })?;

    Ok(Resolved { route, handler })
}
