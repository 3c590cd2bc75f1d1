//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     RoutesConfig (root, resources, tweaks)
//!     → table.rs (root → controller tweaks → path tweaks → resource scan)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (path):
//!     → resolver.rs (literal lookup, then path.rs canonical lookup)
//!     → handler registry lookup
//!     → Return: matched route + handler, or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact-match map lookups only; no patterns in the hot path
//! - Deterministic: same config always builds the same table

pub mod path;
pub mod resolver;
pub mod table;

pub use path::canonicalize;
pub use resolver::{lookup, resolve, Resolved};
pub use table::{build_route_table, HandlerCatalog, RouteEntry, RouteTable};
