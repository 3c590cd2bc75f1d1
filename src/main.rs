//! FyMO server (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::request::normalize
//!                                              │
//!                                              ▼
//!                                     routing::resolve ◀── RouteTable
//!                                              │             (built at startup
//!                                              ▼              from [routes])
//!                                     dispatch::Dispatcher ◀── HandlerRegistry
//!                                              │             (controllers)
//!                                              ▼
//!                                     operation (security::gate)
//!                                              │
//!     Client Response                          ▼
//!     ◀────────────── http::server ◀── http::response::encode
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use fymo::config::{load_config, AppConfig};
use fymo::controllers;
use fymo::lifecycle::{signals, Application, Shutdown};
use fymo::observability::{logging, metrics};
use fymo::routing::build_route_table;

#[derive(Parser)]
#[command(name = "fymo", version, about = "Configuration-driven routing and dispatch server")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, default_value = "fymo.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the server (default).
    Serve {
        /// Override `server.host`.
        #[arg(long)]
        host: Option<String>,

        /// Override `server.port`.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the route table and exit.
    Routes,
    /// Validate the configuration and handler registrations, then exit.
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => serve(config, host, port).await,
        Command::Routes => print_routes(&config),
        Command::Check => check(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    logging::init(&config.observability, config.environment)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), environment = %config.environment, "fymo starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let app = Application::build(config, controllers::registry()?)?;
    let listener = app.bind().await?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    app.serve(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = controllers::registry()?;
    let table = build_route_table(&config.routes, &registry);
    print!("{}", table.render());
    Ok(())
}

fn check(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = controllers::registry()?;
    let table = build_route_table(&config.routes, &registry);
    registry.check_routes(&table)?;
    println!(
        "OK: {} routes, {} handlers, environment {}",
        table.len(),
        registry.len(),
        config.environment
    );
    Ok(())
}
