//! Update applicator: merges a downloaded payload into content and persists the result.
//!
//! Two independent targets receive each payload:
//! - the snapshot store, through a fresh instance built from the last snapshot, so the written file
//!   is exactly "previous snapshot + this update" whatever the live object is doing;
//! - the live instance, merged in place under its write lock when the execution state allows it.
//!
//! Persistence runs first. `saved` is written only after the snapshot write succeeds, and
//! `applied` is written only while `saved` holds the same validator, so `applied` never leads.

use crate::config::{ApplyPolicy, CoppyConfig};
use crate::content::{ContentDocument, ContentRegistry, MergeableContent, parse_document};
use crate::remote::Validator;
use crate::store::{SnapshotStore, ValidatorStore};
use crate::sync::events::{EventDispatcher, SyncEvent};
use crate::sync::lifecycle::ExecutionContext;
use crate::sync::{ApplyReport, SyncError};

use serde_json::Value;
use std::sync::{Arc, PoisonError};
use tracing::{debug, info, warn};

pub struct UpdateApplicator<T: MergeableContent> {
	registry: Arc<ContentRegistry<T>>,
	validators: Arc<dyn ValidatorStore>,
	snapshots: Arc<dyn SnapshotStore>,
	execution: Arc<dyn ExecutionContext>,
	events: Arc<EventDispatcher>,
	policy: ApplyPolicy,
}

impl<T: MergeableContent> UpdateApplicator<T> {
	pub fn new(
		registry: Arc<ContentRegistry<T>>,
		validators: Arc<dyn ValidatorStore>,
		snapshots: Arc<dyn SnapshotStore>,
		execution: Arc<dyn ExecutionContext>,
		events: Arc<EventDispatcher>,
		policy: ApplyPolicy,
	) -> Self {
		Self {
			registry,
			validators,
			snapshots,
			execution,
			events,
			policy,
		}
	}

	/// Apply `bytes`, tagged with `validator`, to the snapshot and the live instance.
	///
	/// A payload that is not a JSON object is rejected before anything is touched. A failed
	/// snapshot write is logged and reported through `ApplyReport::persisted`; it does not stop
	/// the live merge.
	pub async fn apply(
		&self,
		config: &CoppyConfig,
		bytes: &[u8],
		validator: Option<&Validator>,
	) -> Result<ApplyReport, SyncError> {
		let updates = parse_document(bytes)?;
		let mut report = ApplyReport::default();

		let saved = self.validators.get(&config.saved_validator_key).await?;
		if saved.as_ref() != validator {
			match self.persist(config, &updates, validator).await {
				Ok(()) => report.persisted = true,
				Err(e) => warn!("Failed to persist content update: {}", e),
			}
		}

		if self.live_merge_allowed() {
			self.merge_live(&updates).await;
			report.live_merged = true;

			self.events
				.dispatch(&SyncEvent::LiveContentMerged {
					content_key: config.content_key.clone(),
					validator: validator.cloned(),
				})
				.await;

			report.applied_recorded = self.record_applied(config, validator).await?;
		} else {
			debug!("App is in the foreground, deferring live merge to a later trigger");
		}

		Ok(report)
	}

	/// Whether a payload applied now would reach the live instance.
	pub fn live_merge_allowed(&self) -> bool {
		match self.policy {
			ApplyPolicy::Immediate => true,
			ApplyPolicy::BackgroundOnly => self.execution.is_background(),
		}
	}

	async fn merge_live(&self, updates: &ContentDocument) {
		let content = self.registry.get_or_load().await;
		let mut guard = content.write().unwrap_or_else(PoisonError::into_inner);
		guard.merge_fields(updates);
	}

	async fn persist(
		&self,
		config: &CoppyConfig,
		updates: &ContentDocument,
		validator: Option<&Validator>,
	) -> Result<(), SyncError> {
		let mut fresh = self.registry.load_fresh().await?;
		fresh.merge_fields(updates);

		let document = fresh.to_document()?;
		let bytes = serde_json::to_vec(&Value::Object(document)).map_err(|e| {
			SyncError::SerializationFailure(format!("Failed to encode snapshot: {}", e))
		})?;

		self.snapshots.write(&config.snapshot_path, &bytes).await?;

		// Only after the bytes are durable.
		if let Some(validator) = validator {
			self.validators
				.set(&config.saved_validator_key, validator)
				.await?;
		}

		info!(
			"Persisted content for {} at validator {:?}",
			config.content_key, validator
		);
		self.events
			.dispatch(&SyncEvent::SnapshotPersisted {
				content_key: config.content_key.clone(),
				validator: validator.cloned(),
			})
			.await;
		Ok(())
	}

	async fn record_applied(
		&self,
		config: &CoppyConfig,
		validator: Option<&Validator>,
	) -> Result<bool, SyncError> {
		let Some(validator) = validator else {
			return Ok(false);
		};

		let saved = self.validators.get(&config.saved_validator_key).await?;
		if saved.as_ref() != Some(validator) {
			debug!(
				"Not recording applied validator {}: saved is {:?}",
				validator, saved
			);
			return Ok(false);
		}

		self.validators
			.set(&config.applied_validator_key, validator)
			.await?;
		Ok(true)
	}
}
