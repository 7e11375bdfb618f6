//! Content Synchronization Module
//!
//! This module provides the core logic for keeping the live content object in step with the
//! published document:
//!
//! - `engine`: Probes the endpoint, classifies the attempt and obtains the bytes to apply.
//! - `applicator`: Persists payloads as snapshots and merges them into the live instance.
//! - `events`: Event types and handlers for observing sync progress.
//! - `lifecycle`: Execution state reported by the host application.
//! - `single_flight`: Per-key guard preventing overlapping attempts.
//! - `types`: Errors, decisions and outcomes.

/// Payload persistence and live merge
pub mod applicator;
/// Main coordinator for a sync attempt
pub mod engine;
/// Event system for observing sync attempts
pub mod events;
/// Host execution state
pub mod lifecycle;
/// Per-key single-flight guard
pub mod single_flight;
mod types;

pub use applicator::UpdateApplicator;
pub use engine::{SyncEngine, decide};
pub use events::{EventDispatcher, SyncEvent, SyncEventHandler};
pub use lifecycle::{ExecutionContext, ExecutionState, LifecycleState};
pub use single_flight::SingleFlight;
pub use types::*;
