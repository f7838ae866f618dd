//! Shared value types for cask manifests.
//!
//! These types are produced by the parser in `cask-core` and consumed by the
//! resolver, the planner and the CLI. Constructors validate their input so
//! that a value of one of these types is always well-formed.

pub mod arch;
pub mod hash;
pub mod types;

// Re-exports
pub use arch::*;
pub use hash::*;
pub use types::*;

/// Literal spelling of the checksum sentinel that disables verification.
pub const NO_CHECK: &str = "no_check";
