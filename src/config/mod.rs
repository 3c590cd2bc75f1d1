//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! fymo.toml
//!     → loader.rs (parse & deserialize, FYMO_ENV override)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → routes section handed to the route table builder
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AppConfig;
pub use schema::ControllerOverride;
pub use schema::ControllerTweak;
pub use schema::Environment;
pub use schema::ObservabilityConfig;
pub use schema::PathTweak;
pub use schema::RoutesConfig;
pub use schema::ServerConfig;
