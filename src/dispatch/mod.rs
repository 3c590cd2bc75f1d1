//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! RawRequest
//!     → http::request::normalize (method token, body, headers)
//!     → routing::resolve (route table + handler registry)
//!     → dispatcher.rs (global methods → route methods → handler operation)
//!     → operation (optionally behind security::gate)
//!     → http::response::encode
//!     → EncodedResponse
//!
//! Any step may fail with error.rs::RequestError; Dispatcher::handle is the
//! only place those become responses.
//! ```

pub mod dispatcher;
pub mod error;

pub use dispatcher::Dispatcher;
pub use error::{RequestError, RequestResult};
