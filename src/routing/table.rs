//! Route table construction.
//!
//! # Responsibilities
//! - Turn the `[routes]` configuration into path -> handler entries
//! - Apply root, controller tweaks, path tweaks and resource scans in order
//! - Freeze the result as an immutable table
//!
//! # Design Decisions
//! - Later steps overwrite earlier ones on the same path (last writer wins)
//! - A controller tweak with `unique = true` keeps the resource scan from
//!   adding the handler's default path
//! - A resource with no handlers is skipped with a warning, never fatal
//! - Pure function of (config, catalog): no globals, trivially testable

use std::collections::BTreeMap;

use axum::http::Method;

use crate::config::{ControllerTweak, RoutesConfig};
use crate::handler::HandlerRegistry;
use crate::routing::path::ensure_leading_slash;

/// Source of handler names per resource namespace.
pub trait HandlerCatalog {
    /// Routable handler names under `namespace`, or `None` if the namespace
    /// does not exist.
    fn handlers_in(&self, namespace: &str) -> Option<Vec<String>>;
}

impl HandlerCatalog for HandlerRegistry {
    fn handlers_in(&self, namespace: &str) -> Option<Vec<String>> {
        HandlerRegistry::handlers_in(self, namespace)
    }
}

/// A single route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: String,
    pub handler_id: String,
    pub allowed_methods: Option<Vec<Method>>,
}

impl RouteEntry {
    pub fn new(path: impl Into<String>, handler_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            handler_id: handler_id.into(),
            allowed_methods: None,
        }
    }

    pub fn with_methods(mut self, methods: Option<Vec<Method>>) -> Self {
        self.allowed_methods = methods;
        self
    }

    /// Returns true if the route puts no restriction on `method` or lists it.
    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods
            .as_ref()
            .is_none_or(|methods| methods.contains(method))
    }

    fn methods_label(&self) -> String {
        match &self.allowed_methods {
            None => "-".to_string(),
            Some(methods) => methods
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Immutable path -> route mapping.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: BTreeMap<String, RouteEntry>,
}

impl RouteTable {
    pub fn get(&self, path: &str) -> Option<&RouteEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.values()
    }

    fn insert(&mut self, entry: RouteEntry) {
        if let Some(previous) = self.entries.get(&entry.path) {
            if previous != &entry {
                tracing::debug!(
                    path = %entry.path,
                    previous = %previous.handler_id,
                    handler = %entry.handler_id,
                    "Route overwritten"
                );
            }
        }
        self.entries.insert(entry.path.clone(), entry);
    }

    /// Log one line per route.
    pub fn log_routes(&self) {
        for entry in self.iter() {
            tracing::info!(
                path = %entry.path,
                handler = %entry.handler_id,
                allowed_methods = %entry.methods_label(),
                "Route"
            );
        }
        tracing::info!(routes = self.len(), "Route table built");
    }

    /// Fixed-width listing: path, handler, allowed methods.
    pub fn render(&self) -> String {
        let mut out = format!("{:<24}{:<24}{}\n", "Path", "Handler", "Allowed Methods");
        for entry in self.iter() {
            out.push_str(&format!(
                "{:<24}{:<24}{}\n",
                entry.path,
                entry.handler_id,
                entry.methods_label()
            ));
        }
        out
    }
}

/// Build the route table.
///
/// Order matters: root, then `tweaks.controller`, then `tweaks.path`, then
/// one default path per handler of every resource. Each step overwrites
/// earlier entries on the same path.
pub fn build_route_table<C: HandlerCatalog + ?Sized>(config: &RoutesConfig, catalog: &C) -> RouteTable {
    let mut table = RouteTable::default();
    let controller_tweaks = &config.tweaks.controller;

    if let Some(root) = &config.root {
        table.insert(RouteEntry::new("/", root.clone()));
    }

    for (handler_id, tweak) in controller_tweaks {
        match tweak {
            ControllerTweak::Alias(path) => {
                table.insert(RouteEntry::new(ensure_leading_slash(path), handler_id.clone()));
            }
            ControllerTweak::Detailed(detail) => {
                if let Some(path) = &detail.path {
                    table.insert(
                        RouteEntry::new(ensure_leading_slash(path), handler_id.clone())
                            .with_methods(parse_methods(handler_id, detail.allowed_methods.as_deref())),
                    );
                }
            }
        }
    }

    for (path, tweak) in &config.tweaks.path {
        table.insert(RouteEntry::new(ensure_leading_slash(path), tweak.handler_id()));
    }

    for resource in &config.resources {
        let Some(names) = catalog.handlers_in(resource) else {
            tracing::warn!(
                resource = %resource,
                "No handlers registered for resource, skipping"
            );
            continue;
        };

        for name in names {
            let handler_id = format!("{}.{}", resource, name);
            let tweak = controller_tweaks.get(&handler_id);
            if tweak.is_some_and(ControllerTweak::is_unique) {
                tracing::debug!(handler = %handler_id, "Unique handler, default path skipped");
                continue;
            }

            // A methods-only tweak restricts the default path.
            let methods = match tweak {
                Some(ControllerTweak::Detailed(detail)) if detail.path.is_none() => {
                    parse_methods(&handler_id, detail.allowed_methods.as_deref())
                }
                _ => None,
            };

            table.insert(
                RouteEntry::new(format!("/{}/{}", resource, name), handler_id).with_methods(methods),
            );
        }
    }

    table
}

fn parse_methods(handler_id: &str, names: Option<&[String]>) -> Option<Vec<Method>> {
    let names = names?;
    let mut methods = Vec::with_capacity(names.len());
    for name in names {
        match Method::from_bytes(name.trim().to_ascii_uppercase().as_bytes()) {
            Ok(method) if !methods.contains(&method) => methods.push(method),
            Ok(_) => {}
            Err(_) => tracing::warn!(handler = %handler_id, method = %name, "Ignoring invalid method"),
        }
    }
    Some(methods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ControllerOverride, PathTweak};
    use std::collections::HashMap;

    struct StaticCatalog(HashMap<&'static str, Vec<&'static str>>);

    impl HandlerCatalog for StaticCatalog {
        fn handlers_in(&self, namespace: &str) -> Option<Vec<String>> {
            self.0
                .get(namespace)
                .map(|names| names.iter().map(|n| n.to_string()).collect())
        }
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog(HashMap::from([
            ("posts", vec!["index", "show"]),
            ("home", vec!["index", "home"]),
        ]))
    }

    fn detailed(path: Option<&str>, methods: Option<&[&str]>, unique: bool) -> ControllerTweak {
        ControllerTweak::Detailed(ControllerOverride {
            path: path.map(String::from),
            allowed_methods: methods.map(|m| m.iter().map(|s| s.to_string()).collect()),
            unique,
        })
    }

    #[test]
    fn test_root_only() {
        let config = RoutesConfig {
            root: Some("home.index".into()),
            ..Default::default()
        };
        let table = build_route_table(&config, &catalog());
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("/"), Some(&RouteEntry::new("/", "home.index")));
    }

    #[test]
    fn test_resource_default_paths() {
        let config = RoutesConfig {
            resources: vec!["posts".into()],
            ..Default::default()
        };
        let table = build_route_table(&config, &catalog());
        let paths: Vec<&str> = table.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/posts/index", "/posts/show"]);
        assert_eq!(table.get("/posts/show").unwrap().handler_id, "posts.show");
    }

    #[test]
    fn test_missing_resource_is_skipped() {
        let config = RoutesConfig {
            resources: vec!["comments".into(), "home".into()],
            ..Default::default()
        };
        let table = build_route_table(&config, &catalog());
        assert_eq!(table.len(), 2);
        assert!(table.contains("/home/index"));
        assert!(table.iter().all(|e| !e.path.starts_with("/comments")));
    }

    #[test]
    fn test_alias_and_detailed_controller_tweaks() {
        let mut config = RoutesConfig::default();
        config.tweaks.controller.insert("home.home".into(), ControllerTweak::Alias("home".into()));
        config
            .tweaks
            .controller
            .insert("posts.index".into(), detailed(Some("/zz"), Some(&["get", "post", "GET"]), false));

        let table = build_route_table(&config, &catalog());
        assert_eq!(table.get("/home"), Some(&RouteEntry::new("/home", "home.home")));
        assert_eq!(
            table.get("/zz").unwrap().allowed_methods,
            Some(vec![Method::GET, Method::POST])
        );
    }

    #[test]
    fn test_path_tweak_survives_resource_scan() {
        let mut config = RoutesConfig::default();
        config.resources = vec!["posts".into()];
        config
            .tweaks
            .path
            .insert("/legacy".into(), PathTweak::Handler("posts.index".into()));

        let table = build_route_table(&config, &catalog());
        assert_eq!(table.get("/legacy").unwrap().handler_id, "posts.index");
        assert_eq!(table.get("/posts/index").unwrap().handler_id, "posts.index");
    }

    #[test]
    fn test_path_tweak_overwrites_controller_tweak() {
        let mut config = RoutesConfig::default();
        config
            .tweaks
            .controller
            .insert("posts.show".into(), detailed(Some("/shared"), Some(&["GET"]), false));
        config
            .tweaks
            .path
            .insert("/shared".into(), PathTweak::Handler("home.index".into()));

        let table = build_route_table(&config, &catalog());
        assert_eq!(table.get("/shared"), Some(&RouteEntry::new("/shared", "home.index")));
    }

    #[test]
    fn test_resource_scan_overwrites_tweaks() {
        let mut config = RoutesConfig::default();
        config.resources = vec!["posts".into()];
        config
            .tweaks
            .path
            .insert("/posts/show".into(), PathTweak::Handler("home.index".into()));

        let table = build_route_table(&config, &catalog());
        assert_eq!(table.get("/posts/show").unwrap().handler_id, "posts.show");
    }

    #[test]
    fn test_unique_handler_keeps_tweak_path() {
        let mut config = RoutesConfig::default();
        config.resources = vec!["posts".into()];
        config
            .tweaks
            .controller
            .insert("posts.show".into(), detailed(None, None, true));
        config
            .tweaks
            .path
            .insert("/posts/show".into(), PathTweak::Handler("home.index".into()));

        let table = build_route_table(&config, &catalog());
        assert_eq!(table.get("/posts/show").unwrap().handler_id, "home.index");
    }

    #[test]
    fn test_methods_only_tweak_restricts_default_path() {
        let mut config = RoutesConfig::default();
        config.resources = vec!["posts".into()];
        config
            .tweaks
            .controller
            .insert("posts.index".into(), detailed(None, Some(&["GET"]), false));

        let table = build_route_table(&config, &catalog());
        let entry = table.get("/posts/index").unwrap();
        assert!(entry.allows(&Method::GET));
        assert!(!entry.allows(&Method::PUT));
        assert!(table.get("/posts/show").unwrap().allows(&Method::PUT));
    }

    #[test]
    fn test_every_declared_path_maps_to_its_entry() {
        let mut config = RoutesConfig::default();
        config.root = Some("home.index".into());
        config.resources = vec!["posts".into(), "home".into()];
        config.tweaks.controller.insert("home.home".into(), ControllerTweak::Alias("/welcome".into()));
        config
            .tweaks
            .path
            .insert("/legacy".into(), PathTweak::Controller { controller: "posts.index".into() });

        let table = build_route_table(&config, &catalog());
        let expected = [
            ("/", "home.index"),
            ("/welcome", "home.home"),
            ("/legacy", "posts.index"),
            ("/posts/index", "posts.index"),
            ("/posts/show", "posts.show"),
            ("/home/index", "home.index"),
            ("/home/home", "home.home"),
        ];
        assert_eq!(table.len(), expected.len());
        for (path, handler) in expected {
            let entry = table.get(path).unwrap();
            assert_eq!(entry.path, path);
            assert_eq!(entry.handler_id, handler);
        }
        assert!(table.iter().all(|e| e.path.starts_with('/')));
    }

    #[test]
    fn test_render_lists_routes() {
        let config = RoutesConfig {
            root: Some("home.index".into()),
            ..Default::default()
        };
        let rendered = build_route_table(&config, &catalog()).render();
        assert!(rendered.starts_with("Path"));
        assert!(rendered.contains("home.index"));
    }
}
