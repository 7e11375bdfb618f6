//! Content objects and the live-instance registry.

/// Merge contract implemented by content types
pub mod merge;
/// Live instance holder
pub mod registry;

pub use merge::{ContentDocument, MergeableContent, merge_field, parse_document};
pub use registry::{ContentRegistry, SharedContent};
