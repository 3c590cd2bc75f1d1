//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher selects operation
//!     → gate.rs (opt-in, per operation: require Authorization)
//!     → operation runs, or 401 without running it
//! ```
//!
//! # Design Decisions
//! - Opt-in per operation, never a pipeline-wide filter
//! - Fail closed: a blank credential counts as missing
//! - No trust in client input

pub mod gate;

pub use gate::authenticated;
