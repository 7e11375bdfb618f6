//!
//! Utility module for content sync.
//!
//! Re-exports file helpers shared by the validator and snapshot stores.
/// Atomic file replacement
pub mod fs;

pub use fs::write_atomic;
