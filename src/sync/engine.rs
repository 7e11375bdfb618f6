//! Sync engine: probe, classify, obtain bytes, hand them to the applicator.
//!
//! Each attempt:
//! 1. probes the endpoint for the current validator (any transport failure ends the attempt);
//! 2. reads the `saved` and `applied` validators;
//! 3. classifies the situation with [`decide`];
//! 4. downloads the document, or re-reads the snapshot when only the live merge is missing and
//!    the execution state allows it;
//! 5. passes the bytes and their validator to the [`UpdateApplicator`].
//!
//! Attempts are single-flight per content key, and every failure is folded into
//! [`SyncOutcome::Failed`] after being logged.

use crate::config::{CoppyConfig, SyncSettings};
use crate::content::{ContentRegistry, MergeableContent};
use crate::remote::{ContentSource, Validator};
use crate::store::{SnapshotStore, ValidatorStore};
use crate::sync::applicator::UpdateApplicator;
use crate::sync::events::{EventDispatcher, SyncEvent};
use crate::sync::lifecycle::ExecutionContext;
use crate::sync::single_flight::SingleFlight;
use crate::sync::{SyncDecision, SyncError, SyncOutcome};

use std::sync::Arc;
use tracing::{debug, info, warn};

/// Classify one sync attempt from the three validators involved.
///
/// - server differs from `saved`: the server has content newer than anything on disk;
/// - `applied` differs from `saved`: the disk is current but the live object never received it;
/// - otherwise nothing to do.
pub fn decide(
	server: Option<&Validator>,
	saved: Option<&Validator>,
	applied: Option<&Validator>,
) -> SyncDecision {
	if server != saved {
		SyncDecision::FetchAndApply
	} else if applied != saved {
		SyncDecision::ReuseSnapshotAndApply
	} else {
		SyncDecision::NoChange
	}
}

pub struct SyncEngine<T: MergeableContent> {
	/// `None` when the app identity could not be resolved; every attempt is then skipped.
	config: Option<CoppyConfig>,
	source: Arc<dyn ContentSource>,
	validators: Arc<dyn ValidatorStore>,
	snapshots: Arc<dyn SnapshotStore>,
	applicator: UpdateApplicator<T>,
	flights: SingleFlight,
	events: Arc<EventDispatcher>,
	settings: SyncSettings,
}

impl<T: MergeableContent> SyncEngine<T> {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		config: Option<CoppyConfig>,
		source: Arc<dyn ContentSource>,
		validators: Arc<dyn ValidatorStore>,
		snapshots: Arc<dyn SnapshotStore>,
		registry: Arc<ContentRegistry<T>>,
		execution: Arc<dyn ExecutionContext>,
		events: Arc<EventDispatcher>,
		settings: SyncSettings,
	) -> Self {
		let applicator = UpdateApplicator::new(
			registry,
			validators.clone(),
			snapshots.clone(),
			execution,
			events.clone(),
			settings.apply_policy,
		);

		Self {
			config,
			source,
			validators,
			snapshots,
			applicator,
			flights: SingleFlight::new(),
			events,
			settings,
		}
	}

	pub fn settings(&self) -> &SyncSettings {
		&self.settings
	}

	/// Run one sync attempt. A concurrent attempt for the same key returns `Busy` at once.
	pub async fn check_for_updates(&self) -> SyncOutcome {
		let Some(config) = &self.config else {
			debug!("Content sync is not configured, skipping");
			return SyncOutcome::Failed(SyncError::ConfigMissing(
				"content sync is not configured".to_string(),
			));
		};

		let Some(_flight) = self.flights.try_acquire(&config.content_key) else {
			debug!(
				"Sync for {} already in flight, dropping trigger",
				config.content_key
			);
			return SyncOutcome::Busy;
		};

		match self.run(config).await {
			Ok(outcome) => outcome,
			Err(e) => {
				warn!("Content sync for {} abandoned: {}", config.content_key, e);
				self.events
					.dispatch(&SyncEvent::SyncFailed {
						content_key: config.content_key.clone(),
						reason: e.to_string(),
					})
					.await;
				SyncOutcome::Failed(e)
			}
		}
	}

	/// Run one attempt bounded by `SyncSettings::sync_budget`.
	///
	/// Expiry drops the attempt at its current suspension point. Because `saved` is written only
	/// after the snapshot, a cancelled attempt leaves the stores as if it never happened, or with a
	/// newer snapshot whose validator the next attempt will fetch again.
	pub async fn check_with_budget(&self) -> SyncOutcome {
		let budget = self.settings.sync_budget;
		match tokio::time::timeout(budget, self.check_for_updates()).await {
			Ok(outcome) => outcome,
			Err(_) => {
				warn!("Content sync exceeded its budget of {:?}", budget);
				SyncOutcome::Failed(SyncError::BudgetExpired(budget))
			}
		}
	}

	async fn run(&self, config: &CoppyConfig) -> Result<SyncOutcome, SyncError> {
		let server = self.source.probe(&config.content_url).await?;
		let saved = self.validators.get(&config.saved_validator_key).await?;
		let applied = self.validators.get(&config.applied_validator_key).await?;

		let decision = decide(server.as_ref(), saved.as_ref(), applied.as_ref());
		info!(
			"Content {}: server {:?}, saved {:?}, applied {:?} -> {}",
			config.content_key, server, saved, applied, decision
		);
		self.events
			.dispatch(&SyncEvent::DecisionMade {
				content_key: config.content_key.clone(),
				decision,
			})
			.await;

		let (bytes, validator) = match decision {
			SyncDecision::NoChange => return Ok(SyncOutcome::NoChange),
			SyncDecision::FetchAndApply => {
				let fetched = self.source.fetch(&config.content_url).await?;
				(fetched.body, fetched.validator.or(server))
			}
			SyncDecision::ReuseSnapshotAndApply => {
				if !self.applicator.live_merge_allowed() {
					debug!(
						"Snapshot for {} is current, live merge waits for the background",
						config.content_key
					);
					return Ok(SyncOutcome::Deferred { validator: saved });
				}
				let bytes = self
					.snapshots
					.load(&config.snapshot_path)
					.await?
					.ok_or_else(|| {
						SyncError::StorageFailure(format!(
							"snapshot {:?} is missing",
							config.snapshot_path
						))
					})?;
				(bytes, saved)
			}
		};

		let report = self
			.applicator
			.apply(config, &bytes, validator.as_ref())
			.await?;

		Ok(SyncOutcome::Applied {
			decision,
			validator,
			report,
		})
	}
}
