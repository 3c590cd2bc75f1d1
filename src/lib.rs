//! FyMO: configuration-driven request routing and dispatch.

pub mod config;
pub mod controllers;
pub mod dispatch;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::AppConfig;
pub use dispatch::{Dispatcher, RequestError, RequestResult};
pub use handler::{Handler, HandlerRegistry};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
