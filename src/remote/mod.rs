//! Remote content endpoint integration
//!
//! This module provides the transport used by the sync engine: a metadata-only probe that reports
//! the current validator of the published document, and a full download of the document body.

/// HTTP client for the content endpoint
mod client;
/// Validator and response types
mod types;

pub use client::{ContentSource, HttpContentSource};
pub use types::*;
