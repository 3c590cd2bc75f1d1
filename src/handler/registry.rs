//! Handler registry.
//!
//! # Responsibilities
//! - Hold every handler implementation, keyed by id
//! - Enumerate a namespace's handlers for the route table builder
//! - Check at startup that every route names a registered handler
//!
//! # Design Decisions
//! - Built once, then shared read-only behind an `Arc`
//! - Ordered map so namespace scans are deterministic
//! - Names starting with `_`, and `templates`, are internal and never routed

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::handler::{split_handler_id, Handler};
use crate::routing::table::RouteTable;

/// Handler names that resource scans skip.
pub const RESERVED_NAMES: &[&str] = &["templates"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("handler id '{0}' must have the form 'namespace.name'")]
    InvalidId(String),

    #[error("handler '{0}' is registered twice")]
    Duplicate(String),

    #[error("routes reference unregistered handlers: {}", .0.join(", "))]
    Unresolved(Vec<String>),
}

/// Returns true for names a resource scan must not expose.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with('_') || RESERVED_NAMES.contains(&name)
}

/// Handler id -> implementation.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. Ids must be namespace-qualified and unique.
    pub fn register(&mut self, handler: Handler) -> Result<&mut Self, RegistryError> {
        let id = handler.id().to_string();
        if split_handler_id(&id).is_none() {
            return Err(RegistryError::InvalidId(id));
        }
        if self.handlers.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.handlers.insert(id, Arc::new(handler));
        Ok(self)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, handler: Handler) -> Result<Self, RegistryError> {
        self.register(handler)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Handler>> {
        self.handlers.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Routable handler names in `namespace`, sorted. `None` if nothing is
    /// registered under the namespace.
    pub fn handlers_in(&self, namespace: &str) -> Option<Vec<String>> {
        let mut found = false;
        let mut names = Vec::new();
        for id in self.handlers.keys() {
            let Some((ns, name)) = split_handler_id(id) else {
                continue;
            };
            if ns != namespace {
                continue;
            }
            found = true;
            if !is_reserved(name) {
                names.push(name.to_string());
            }
        }
        found.then_some(names)
    }

    /// Routes whose handler id has no implementation, as `path -> id`.
    pub fn unresolved_routes(&self, table: &RouteTable) -> Vec<String> {
        table
            .iter()
            .filter(|entry| !self.contains(&entry.handler_id))
            .map(|entry| format!("{} -> {}", entry.path, entry.handler_id))
            .collect()
    }

    /// Fail if any route names an unregistered handler.
    pub fn check_routes(&self, table: &RouteTable) -> Result<(), RegistryError> {
        let unresolved = self.unresolved_routes(table);
        if unresolved.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::Unresolved(unresolved))
        }
    }
}
