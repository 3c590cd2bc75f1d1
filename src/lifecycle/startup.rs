//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated config and a handler registry into a dispatcher
//! - Bind the listener and run the server until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, after the route table is known good

use std::io;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::dispatch::Dispatcher;
use crate::handler::{HandlerRegistry, RegistryError};
use crate::http::HttpServer;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("handler registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// A configured application, ready to bind.
#[derive(Debug, Clone)]
pub struct Application {
    pub config: AppConfig,
    pub dispatcher: Dispatcher,
}

impl Application {
    /// Build the route table and dispatcher for `config`.
    pub fn build(config: AppConfig, registry: HandlerRegistry) -> Result<Self, StartupError> {
        tracing::info!(
            environment = %config.environment,
            handlers = registry.len(),
            resources = config.routes.resources.len(),
            "Building route table"
        );
        let dispatcher = Dispatcher::from_config(&config, registry)?;
        Ok(Self { config, dispatcher })
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, StartupError> {
        let address = self.config.server.bind_address();
        TcpListener::bind(&address)
            .await
            .map_err(|source| StartupError::Bind { address, source })
    }

    /// Serve on `listener` until `shutdown` fires. Subscribe before spawning
    /// so an early trigger is not missed.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), StartupError> {
        let server = HttpServer::new(self.config.server.clone(), self.dispatcher);
        server
            .run(listener, shutdown)
            .await
            .map_err(StartupError::Serve)
    }
}
