//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, overridable by `RUST_LOG`
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Initialization is fallible so tests and embedders can call it twice

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::LogFormat;
use crate::config::{Environment, ObservabilityConfig};

/// Format used when the config does not pick one.
pub fn default_format(environment: Environment) -> LogFormat {
    if environment.is_production() {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    }
}

/// Install the global subscriber.
pub fn init(config: &ObservabilityConfig, environment: Environment) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("fymo={0},tower_http={0}", config.log_level))
    });
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format.unwrap_or_else(|| default_format(environment)) {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
    }
}
