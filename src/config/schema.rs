//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Development or production mode.
    pub environment: Environment,

    /// Hosting adapter settings (bind address, limits).
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route declarations used to build the route table.
    pub routes: RoutesConfig,
}

/// Runtime mode. Controls how much detail error messages carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    /// Parse a mode name as found in `FYMO_ENV`/`ENV`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Some(Environment::Production),
            "development" | "dev" => Some(Environment::Development),
            _ => None,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// Hosting adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8000,
            request_timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format. Defaults to JSON in production, pretty otherwise.
    pub log_format: Option<LogFormat>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: None,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Declarative route configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Handler id served at "/".
    pub root: Option<String>,

    /// Namespaces whose handlers get default `/{namespace}/{name}` paths.
    pub resources: Vec<String>,

    /// Per-handler and per-path overrides.
    pub tweaks: TweaksConfig,

    /// Refuse to start when a route names an unregistered handler.
    pub strict: bool,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            root: None,
            resources: Vec::new(),
            tweaks: TweaksConfig::default(),
            strict: true,
        }
    }
}

/// Route overrides. Maps are ordered so that builds are deterministic.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TweaksConfig {
    /// Handler id -> alias path or detailed override.
    pub controller: BTreeMap<String, ControllerTweak>,

    /// Literal path -> handler id.
    pub path: BTreeMap<String, PathTweak>,
}

/// Override attached to a handler id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ControllerTweak {
    /// `"home.home" = "/home"`
    Alias(String),
    /// `"posts.index" = { path = "/zz", allowed_methods = ["GET"] }`
    Detailed(ControllerOverride),
}

impl ControllerTweak {
    pub fn is_unique(&self) -> bool {
        matches!(self, ControllerTweak::Detailed(o) if o.unique)
    }

    pub fn allowed_methods(&self) -> Option<&[String]> {
        match self {
            ControllerTweak::Alias(_) => None,
            ControllerTweak::Detailed(o) => o.allowed_methods.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ControllerOverride {
    /// Path to serve the handler at.
    pub path: Option<String>,

    /// Methods accepted on that path.
    pub allowed_methods: Option<Vec<String>>,

    /// Skip the default resource path for this handler.
    pub unique: bool,
}

/// Handler bound to a literal path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathTweak {
    /// `"/legacy" = "posts.index"`
    Handler(String),
    /// `"/legacy" = { controller = "posts.index" }`
    Controller { controller: String },
}

impl PathTweak {
    pub fn handler_id(&self) -> &str {
        match self {
            PathTweak::Handler(id) => id,
            PathTweak::Controller { controller } => controller,
        }
    }
}
