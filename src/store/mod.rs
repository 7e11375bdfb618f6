//! Local persistence for content sync.
//!
//! Two independent stores back the engine: the validator store holds the `saved` and `applied`
//! validators per content key, and the snapshot store holds the last downloaded document. Neither
//! is transactional with the other; the engine orders its writes so that a validator is never
//! recorded for bytes that are not on disk.

/// Snapshot persistence
pub mod snapshot;
/// Validator slot persistence
pub mod validators;

pub use snapshot::{FileSnapshotStore, SnapshotStore};
pub use validators::{FileValidatorStore, MemoryValidatorStore, ValidatorStore};
