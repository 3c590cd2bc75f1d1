//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, Environment};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable selecting the runtime mode.
pub const ENV_VAR: &str = "FYMO_ENV";

/// Older name for [`ENV_VAR`], still honored when the new one is unset.
pub const LEGACY_ENV_VAR: &str = "ENV";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply environment
/// overrides.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;

    let mode = std::env::var(ENV_VAR)
        .ok()
        .or_else(|| std::env::var(LEGACY_ENV_VAR).ok());
    apply_environment_override(&mut config, mode.as_deref());

    Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Override the configured mode with the value of the mode variable, if it
/// names a known mode.
pub fn apply_environment_override(config: &mut AppConfig, value: Option<&str>) {
    let Some(value) = value else {
        return;
    };
    match Environment::parse(value) {
        Some(environment) => config.environment = environment,
        None => tracing::warn!(value = %value, "Ignoring unknown environment override"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ControllerTweak, PathTweak};

    const SAMPLE: &str = r#"
        environment = "production"

        [server]
        port = 9000

        [routes]
        root = "home.index"
        resources = ["posts", "home"]

        [routes.tweaks.controller]
        "home.home" = "/home"
        "posts.index" = { path = "/zz", allowed_methods = ["get"] }
        "posts.show" = { unique = true }

        [routes.tweaks.path]
        "/legacy" = "posts.index"
        "/old" = { controller = "home.index" }
    "#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.routes.root.as_deref(), Some("home.index"));
        assert_eq!(config.routes.resources, vec!["posts", "home"]);
        assert!(config.routes.strict);

        let controller = &config.routes.tweaks.controller;
        assert_eq!(controller["home.home"], ControllerTweak::Alias("/home".into()));
        assert_eq!(
            controller["posts.index"].allowed_methods(),
            Some(&["get".to_string()][..])
        );
        assert!(controller["posts.show"].is_unique());

        let path = &config.routes.tweaks.path;
        assert_eq!(path["/legacy"], PathTweak::Handler("posts.index".into()));
        assert_eq!(path["/old"].handler_id(), "home.index");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.bind_address(), "localhost:8000");
        assert!(config.routes.tweaks.controller.is_empty());
    }

    #[test]
    fn test_validation_errors_surface() {
        let err = parse_config("[routes]\nroot = \"home\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("namespace.name"));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[routes\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_environment_override() {
        let mut config = AppConfig::default();
        apply_environment_override(&mut config, Some("PRODUCTION"));
        assert_eq!(config.environment, Environment::Production);

        apply_environment_override(&mut config, Some("staging"));
        assert_eq!(config.environment, Environment::Production);

        apply_environment_override(&mut config, None);
        assert_eq!(config.environment, Environment::Production);

        apply_environment_override(&mut config, Some("dev"));
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
