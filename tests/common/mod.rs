//! Shared utilities for integration tests.

use std::net::SocketAddr;

use fymo::config::{parse_config, Environment};
use fymo::controllers;
use fymo::lifecycle::{Application, Shutdown};
use tokio::net::TcpListener;

/// Routes used by most tests.
pub const ROUTES: &str = r#"
[routes]
root = "home.index"
resources = ["home", "posts", "new"]

[routes.tweaks.controller]
"home.home" = "/home"

[routes.tweaks.path]
"/legacy" = "posts.index"
"#;

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop the server and wait for it to drain.
    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

/// Start the bundled controllers behind `config_toml` in `environment`.
pub async fn spawn_server(config_toml: &str, environment: Environment) -> TestServer {
    let mut config = parse_config(config_toml).unwrap();
    config.environment = environment;

    let app = Application::build(config, controllers::registry().unwrap()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        app.serve(listener, receiver).await.unwrap();
    });

    TestServer { addr, shutdown, handle }
}
