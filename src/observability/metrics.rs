//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fymo_requests_total` (counter): requests by method, status
//! - `fymo_request_duration_seconds` (histogram): pipeline latency
//! - `fymo_routes` (gauge): size of the route table
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels stay low-cardinality: no paths, and methods outside the global
//!   set share the `other` bucket

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::http::request::is_global_method;

/// Label for methods outside the global set.
pub const OTHER_METHOD: &str = "other";

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Metric label for a client-supplied method token. Only exact global
/// method names get their own series.
pub fn method_label(method: &str) -> String {
    match Method::from_bytes(method.as_bytes()) {
        Ok(m) if is_global_method(&m) => m.as_str().to_owned(),
        _ => OTHER_METHOD.to_owned(),
    }
}

/// Record a completed pipeline call.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method_label(method);
    metrics::counter!(
        "fymo_requests_total",
        "method" => method.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("fymo_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_routes(count: usize) {
    metrics::gauge!("fymo_routes").set(count as f64);
}
