//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check handler ids are namespace-qualified
//! - Check tweak paths are absolute
//! - Check allowed methods are within the global method set
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{AppConfig, ControllerTweak};
use crate::handler::split_handler_id;
use crate::http::request::is_global_method_name;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("handler id '{0}' must have the form 'namespace.name'")]
    HandlerId(String),

    #[error("path '{0}' must start with '/'")]
    RelativePath(String),

    #[error("allowed_methods for '{0}' must not be empty")]
    EmptyMethods(String),

    #[error("method '{method}' for '{handler}' is not one of GET, POST, PUT, DELETE, PATCH, OPTIONS")]
    UnknownMethod { handler: String, method: String },

    #[error("resource name '{0}' must be a non-empty name without '.' or '/'")]
    ResourceName(String),

    #[error("server.port must not be 0")]
    Port,

    #[error("server.request_timeout_secs must be greater than 0")]
    Timeout,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let routes = &config.routes;

    if config.server.port == 0 {
        errors.push(ValidationError::Port);
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::Timeout);
    }

    if let Some(root) = &routes.root {
        check_handler_id(root, &mut errors);
    }

    for resource in &routes.resources {
        if resource.is_empty() || resource.contains('.') || resource.contains('/') {
            errors.push(ValidationError::ResourceName(resource.clone()));
        }
    }

    for (handler, tweak) in &routes.tweaks.controller {
        check_handler_id(handler, &mut errors);
        match tweak {
            ControllerTweak::Alias(path) => {
                if path.trim_matches('/').is_empty() {
                    errors.push(ValidationError::RelativePath(path.clone()));
                }
            }
            ControllerTweak::Detailed(detail) => {
                if let Some(path) = &detail.path {
                    check_path(path, &mut errors);
                }
                if let Some(methods) = &detail.allowed_methods {
                    if methods.is_empty() {
                        errors.push(ValidationError::EmptyMethods(handler.clone()));
                    }
                    for method in methods {
                        if !is_global_method_name(method) {
                            errors.push(ValidationError::UnknownMethod {
                                handler: handler.clone(),
                                method: method.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    for (path, tweak) in &routes.tweaks.path {
        check_path(path, &mut errors);
        check_handler_id(tweak.handler_id(), &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_handler_id(id: &str, errors: &mut Vec<ValidationError>) {
    if split_handler_id(id).is_none() {
        errors.push(ValidationError::HandlerId(id.to_string()));
    }
}

fn check_path(path: &str, errors: &mut Vec<ValidationError>) {
    if !path.starts_with('/') {
        errors.push(ValidationError::RelativePath(path.to_string()));
    }
}
