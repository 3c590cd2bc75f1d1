//! Controllers shipped with the application.
//!
//! Each submodule contributes handlers to one namespace; [`registry`] collects
//! them for the dispatcher.

pub mod home;
pub mod new_app;
pub mod posts;

use crate::handler::{HandlerRegistry, RegistryError};

/// Every bundled handler.
pub fn registry() -> Result<HandlerRegistry, RegistryError> {
    HandlerRegistry::new()
        .with(home::index())?
        .with(home::home())?
        .with(posts::index())?
        .with(new_app::app())
}
