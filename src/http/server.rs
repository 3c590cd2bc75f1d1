//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Translate axum requests into `RawRequest` and encoded responses back
//! - Run each pipeline call on the blocking pool
//! - Serve until the shutdown signal fires

use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::RawRequest;
use crate::http::response::EncodedResponse;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub max_body_size: usize,
}

/// HTTP front end for the dispatch pipeline.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        let state = AppState {
            dispatcher,
            max_body_size: config.max_body_size,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: hand the call to the dispatcher.
async fn gateway_handler(State(state): State<AppState>, request: Request) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let raw = match into_raw_request(request, state.max_body_size, &request_id).await {
        Ok(raw) => raw,
        Err(response) => return response,
    };

    let dispatcher = state.dispatcher.clone();
    let worker_id = request_id.clone();
    match tokio::task::spawn_blocking(move || dispatch_with_request_id(&dispatcher, raw, &worker_id)).await {
        Ok(encoded) => into_response(encoded),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Pipeline worker failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Run one pipeline call inside a span tagged with the request ID, so every
/// event the dispatcher emits carries it.
fn dispatch_with_request_id(dispatcher: &Dispatcher, raw: RawRequest, request_id: &str) -> EncodedResponse {
    let span = tracing::info_span!("request", request_id = %request_id);
    let _entered = span.enter();
    dispatcher.handle(raw)
}

async fn into_raw_request(request: Request, limit: usize, request_id: &str) -> Result<RawRequest, Response> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, limit).await.map_err(|e| {
        let status = body_error_status(&e);
        tracing::warn!(request_id = %request_id, error = %e, limit, status = status.as_u16(), "Request body rejected");
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "Payload Too Large"
        } else {
            "Request body could not be read."
        };
        (status, message).into_response()
    })?;

    let headers = &parts.headers;
    let host = header_value(headers, header::HOST);
    let (server_name, server_port) = match host.as_deref().map(split_host) {
        Some((name, port)) => (Some(name), port),
        None => (parts.uri.host().map(str::to_string), parts.uri.port_u16()),
    };

    Ok(RawRequest {
        method: parts.method.as_str().to_string(),
        path: parts.uri.path().to_string(),
        query_string: parts.uri.query().unwrap_or_default().to_string(),
        accept: header_value(headers, header::ACCEPT),
        user_agent: header_value(headers, header::USER_AGENT),
        cookie: header_value(headers, header::COOKIE),
        authorization: header_value(headers, header::AUTHORIZATION),
        content_type: header_value(headers, header::CONTENT_TYPE),
        server_name,
        server_port,
        body: body.to_vec(),
    })
}

/// 413 when the body hit the size limit, 400 for any other read failure
/// (client disconnects, broken chunking).
fn body_error_status(err: &axum::Error) -> StatusCode {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return StatusCode::PAYLOAD_TOO_LARGE;
        }
        source = e.source();
    }
    StatusCode::BAD_REQUEST
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn split_host(host: &str) -> (String, Option<u16>) {
    match host.rsplit_once(':') {
        Some((name, port)) => match port.parse() {
            Ok(port) => (name.to_string(), Some(port)),
            Err(_) => (host.to_string(), None),
        },
        None => (host.to_string(), None),
    }
}

fn into_response(encoded: EncodedResponse) -> Response {
    let mut builder = Response::builder().status(encoded.status);
    for (name, value) in &encoded.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(Body::from(encoded.body)).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Handler produced an invalid response header");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, RoutesConfig};
    use crate::handler::{Handler, HandlerRegistry};
    use crate::http::request::Request as PipelineRequest;
    use crate::http::response::Response as PipelineResponse;
    use crate::routing::build_route_table;
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;
    use tracing_subscriber::fmt::MakeWriter;

    fn dispatcher() -> Dispatcher {
        let registry = HandlerRegistry::new()
            .with(
                Handler::new("posts.index")
                    .get(|req: &PipelineRequest| {
                        Ok(json!({
                            "host": req.server_name,
                            "port": req.server_port,
                            "agent": req.user_agent,
                        }))
                    })
                    .post(|req: &PipelineRequest| Ok(req.body.get_str("title").unwrap_or("").to_string())),
            )
            .unwrap()
            .with(Handler::new("posts.bad").get(|_| {
                Ok(PipelineResponse::text("x").with_header("X-Bad", "line\nbreak"))
            }))
            .unwrap();
        let routes = RoutesConfig {
            resources: vec!["posts".into()],
            ..Default::default()
        };
        let table = build_route_table(&routes, &registry);
        Dispatcher::new(table, registry, Environment::Development).unwrap()
    }

    fn server(max_body_size: usize) -> HttpServer {
        let config = ServerConfig {
            max_body_size,
            ..Default::default()
        };
        HttpServer::new(config, dispatcher())
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_dispatches_and_sets_request_id() {
        let request = axum::http::Request::builder()
            .uri("/posts")
            .header("host", "example.com:8080")
            .header("user-agent", "test-agent")
            .body(Body::empty())
            .unwrap();
        let response = server(1024).router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({"host": "example.com", "port": 8080, "agent": "test-agent"}));
    }

    #[tokio::test]
    async fn test_keeps_incoming_request_id() {
        let request = axum::http::Request::builder()
            .uri("/posts/index")
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = server(1024).router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");
    }

    #[tokio::test]
    async fn test_form_post() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/posts/index")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("title=Hello+World"))
            .unwrap();
        let response = server(1024).router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Hello World");
    }

    #[tokio::test]
    async fn test_body_limit() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/posts/index")
            .header("content-type", "application/json")
            .body(Body::from(vec![b' '; 64]))
            .unwrap();
        let response = server(16).router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_invalid_handler_header_is_500() {
        let request = axum::http::Request::builder()
            .uri("/posts/bad")
            .body(Body::empty())
            .unwrap();
        let response = server(1024).router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_pipeline_events_carry_request_id() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let dispatcher = dispatcher();

        tracing::subscriber::with_default(subscriber, || {
            dispatch_with_request_id(&dispatcher, RawRequest::new("GET", "/posts"), "req-42");
            dispatch_with_request_id(&dispatcher, RawRequest::new("GET", "/missing"), "req-43");
        });

        let output = logs.text();
        let line = |needle: &str, id: &str| {
            output
                .lines()
                .any(|l| l.contains(needle) && l.contains(&format!("request_id={}", id)))
        };
        assert!(line("Dispatching", "req-42"), "{}", output);
        assert!(line("Request completed", "req-42"), "{}", output);
        assert!(line("Request rejected", "req-43"), "{}", output);
        assert!(line("Request completed", "req-43"), "{}", output);
    }

    #[tokio::test]
    async fn test_body_error_status() {
        let too_large = axum::body::to_bytes(Body::from(vec![0u8; 64]), 16)
            .await
            .unwrap_err();
        assert_eq!(body_error_status(&too_large), StatusCode::PAYLOAD_TOO_LARGE);

        let reset = axum::Error::new(io::Error::new(io::ErrorKind::ConnectionReset, "client went away"));
        assert_eq!(body_error_status(&reset), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_split_host() {
        assert_eq!(split_host("example.com"), ("example.com".into(), None));
        assert_eq!(split_host("example.com:8080"), ("example.com".into(), Some(8080)));
        assert_eq!(split_host("[::1]:80"), ("[::1]".into(), Some(80)));
    }
}
