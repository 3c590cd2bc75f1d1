//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, body limit)
//!     → request.rs (RawRequest → normalized Request)
//!     → [dispatch pipeline]
//!     → response.rs (Response → EncodedResponse)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RawRequest, Request};
pub use response::{EncodedResponse, Response};
pub use server::{HttpServer, X_REQUEST_ID};
