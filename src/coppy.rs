//! Application-facing entry point.
//!
//! `Coppy` wires the registry, stores, transport and engine together and exposes the two things
//! an app needs: the live content handle and the trigger entry points its lifecycle adapter calls.

use crate::config::{AppIdentity, CoppyConfig, ResolverSettings, SyncSettings, resolve};
use crate::content::{ContentRegistry, MergeableContent, SharedContent};
use crate::remote::{ContentSource, HttpContentSource};
use crate::store::{FileSnapshotStore, FileValidatorStore, SnapshotStore, ValidatorStore};
use crate::sync::{
	EventDispatcher, ExecutionState, LifecycleState, SyncEngine, SyncEventHandler, SyncError,
	SyncOutcome,
};

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct Coppy<T: MergeableContent> {
	engine: Arc<SyncEngine<T>>,
	registry: Arc<ContentRegistry<T>>,
	lifecycle: Arc<LifecycleState>,
	events: Arc<EventDispatcher>,
}

impl<T: MergeableContent> Clone for Coppy<T> {
	fn clone(&self) -> Self {
		Self {
			engine: self.engine.clone(),
			registry: self.registry.clone(),
			lifecycle: self.lifecycle.clone(),
			events: self.events.clone(),
		}
	}
}

impl<T: MergeableContent> Coppy<T> {
	/// Build the default HTTP and file-backed stack, load the live instance and schedule the
	/// initial check.
	///
	/// A missing content key or app version does not fail initialisation: content is served from
	/// defaults and every sync attempt is skipped.
	pub async fn initialize(
		identity: &AppIdentity,
		resolver: &ResolverSettings,
		settings: SyncSettings,
	) -> Result<Self, SyncError> {
		let config = match resolve(identity, resolver) {
			Ok(config) => Some(config),
			Err(e) => {
				warn!("Content sync disabled: {}", e);
				None
			}
		};

		let source = Arc::new(HttpContentSource::new(settings.request_timeout)?);
		let validators = Arc::new(FileValidatorStore::in_dir(resolver.support_dir.clone()));
		let snapshots = Arc::new(FileSnapshotStore::new());

		let coppy = Self::with_parts(
			config,
			source,
			validators,
			snapshots,
			Arc::new(LifecycleState::default()),
			settings,
		);

		coppy.registry.get_or_load().await;
		coppy.on_sync_trigger();

		info!("Content sync initialized");
		Ok(coppy)
	}

	/// Assemble from injected collaborators. Nothing is loaded or scheduled.
	pub fn with_parts(
		config: Option<CoppyConfig>,
		source: Arc<dyn ContentSource>,
		validators: Arc<dyn ValidatorStore>,
		snapshots: Arc<dyn SnapshotStore>,
		lifecycle: Arc<LifecycleState>,
		settings: SyncSettings,
	) -> Self {
		let snapshot_path = config.as_ref().map(|c| c.snapshot_path.clone());
		let registry = Arc::new(ContentRegistry::new(snapshots.clone(), snapshot_path));
		let events = Arc::new(EventDispatcher::new());

		let engine = Arc::new(SyncEngine::new(
			config,
			source,
			validators,
			snapshots,
			registry.clone(),
			lifecycle.clone(),
			events.clone(),
			settings,
		));

		Self {
			engine,
			registry,
			lifecycle,
			events,
		}
	}

	/// The live content instance, loaded from the last snapshot on first call.
	pub async fn content(&self) -> SharedContent<T> {
		self.registry.get_or_load().await
	}

	pub fn registry(&self) -> &Arc<ContentRegistry<T>> {
		&self.registry
	}

	pub fn lifecycle(&self) -> &Arc<LifecycleState> {
		&self.lifecycle
	}

	pub fn engine(&self) -> &Arc<SyncEngine<T>> {
		&self.engine
	}

	/// Observe sync events, e.g. to refresh views after a live merge.
	pub fn subscribe(&self, handler: Arc<dyn SyncEventHandler>) {
		self.events.register_handler(handler);
	}

	/// Start a budgeted sync attempt in the background.
	///
	/// A trigger arriving while an attempt is running resolves to `SyncOutcome::Busy`.
	pub fn on_sync_trigger(&self) -> JoinHandle<SyncOutcome> {
		let engine = self.engine.clone();
		tokio::spawn(async move { engine.check_with_budget().await })
	}

	/// Record the move to the background and start an attempt.
	pub fn on_enter_background(&self) -> JoinHandle<SyncOutcome> {
		self.lifecycle.set(ExecutionState::Background);
		self.on_sync_trigger()
	}

	pub fn on_enter_foreground(&self) {
		self.lifecycle.set(ExecutionState::Foreground);
	}

	/// Run a budgeted attempt on the current task.
	pub async fn check_now(&self) -> SyncOutcome {
		self.engine.check_with_budget().await
	}

	/// Trigger an attempt every `SyncSettings::periodic_interval`.
	///
	/// Returns `None` when no interval is configured. Ticks that land while an attempt is still
	/// running are skipped.
	pub fn spawn_periodic(&self) -> Option<JoinHandle<()>> {
		let every = self.engine.settings().periodic_interval?;
		let engine = self.engine.clone();

		Some(tokio::spawn(async move {
			let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

			loop {
				ticker.tick().await;
				let outcome = engine.check_with_budget().await;
				debug!("Periodic content check finished: {:?}", outcome);
			}
		}))
	}
}
