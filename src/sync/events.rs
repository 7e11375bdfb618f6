//! Event system for content synchronization.
//!
//! The engine and the update applicator emit events as a sync attempt moves through its steps.
//! Registered handlers observe them without taking part in the sync itself, which lets the
//! application react to new content (refresh a view, log metrics) while the core stays unaware of
//! who is listening.

use crate::remote::Validator;
use crate::sync::{SyncDecision, SyncError};

use std::sync::{Arc, PoisonError, RwLock};

/// Events that occur during content synchronization
#[derive(Debug, Clone)]
pub enum SyncEvent {
	/// The probe was classified
	DecisionMade {
		content_key: String,
		decision: SyncDecision,
	},
	/// A new snapshot was written and the `saved` validator advanced
	SnapshotPersisted {
		content_key: String,
		validator: Option<Validator>,
	},
	/// The live instance absorbed an update
	LiveContentMerged {
		content_key: String,
		validator: Option<Validator>,
	},
	/// The attempt was abandoned
	SyncFailed { content_key: String, reason: String },
}

/// Trait for handling sync events.
///
/// Implementors receive every event dispatched during a sync attempt.
#[async_trait::async_trait]
pub trait SyncEventHandler: Send + Sync {
	/// Handle a sync event.
	async fn handle(&self, event: &SyncEvent) -> Result<(), SyncError>;

	/// Get the name of this handler for logging and diagnostics.
	fn name(&self) -> &'static str;
}

/// Event dispatcher that manages multiple event handlers.
///
/// Handlers may be registered while attempts are running; each dispatch sees the handlers
/// registered at the time it starts.
#[derive(Default)]
pub struct EventDispatcher {
	handlers: RwLock<Vec<Arc<dyn SyncEventHandler>>>,
}

impl EventDispatcher {
	/// Create a new, empty event dispatcher.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a new event handler.
	///
	/// Handlers are called in the order they are registered.
	pub fn register_handler(&self, handler: Arc<dyn SyncEventHandler>) {
		self.handlers
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.push(handler);
	}

	/// Dispatch an event to all registered handlers.
	///
	/// Errors from handlers are logged, but do not stop other handlers from running.
	pub async fn dispatch(&self, event: &SyncEvent) {
		let handlers = self
			.handlers
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone();

		for handler in handlers {
			if let Err(e) = handler.handle(event).await {
				tracing::error!("Handler {} failed to process event: {}", handler.name(), e);
				// Continue processing with other handlers
			}
		}
	}
}
