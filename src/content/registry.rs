//! Holder of the single live content instance.
//!
//! The registry is created by the application's composition root and shared by handle. It is the
//! only code path that builds the canonical live instance: on first access it loads the last
//! snapshot, merges it onto a default instance and caches the result.

use crate::content::merge::{MergeableContent, parse_document};
use crate::store::SnapshotStore;
use crate::sync::SyncError;

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Handle to the live content instance.
///
/// Readers take the read lock; the update applicator merges under the write lock, so a reader
/// never observes a half-merged object.
pub type SharedContent<T> = Arc<RwLock<T>>;

pub struct ContentRegistry<T: MergeableContent> {
	live: RwLock<Option<SharedContent<T>>>,
	/// Serialises first-access loads so only one canonical instance is ever built.
	load_gate: tokio::sync::Mutex<()>,
	snapshots: Arc<dyn SnapshotStore>,
	/// `None` when configuration is missing; instances are then plain defaults.
	snapshot_path: Option<PathBuf>,
}

impl<T: MergeableContent> ContentRegistry<T> {
	pub fn new(snapshots: Arc<dyn SnapshotStore>, snapshot_path: Option<PathBuf>) -> Self {
		Self {
			live: RwLock::new(None),
			load_gate: tokio::sync::Mutex::new(()),
			snapshots,
			snapshot_path,
		}
	}

	/// The live instance, if one has been loaded or installed.
	pub fn current(&self) -> Option<SharedContent<T>> {
		self.live
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Return the live instance, loading it from the last snapshot on first access.
	pub async fn get_or_load(&self) -> SharedContent<T> {
		if let Some(content) = self.current() {
			return content;
		}

		let _gate = self.load_gate.lock().await;
		if let Some(content) = self.current() {
			return content;
		}

		let instance = match self.load_fresh().await {
			Ok(instance) => instance,
			Err(e) => {
				warn!("Falling back to default content: {}", e);
				T::default()
			}
		};

		let content = Arc::new(RwLock::new(instance));
		*self.live.write().unwrap_or_else(PoisonError::into_inner) = Some(content.clone());
		info!("Loaded live content instance");
		content
	}

	/// Install `instance` as the live object, returning the one it supersedes.
	///
	/// Holders of the previous handle keep reading the old object.
	pub fn replace(&self, instance: T) -> Option<SharedContent<T>> {
		let content = Arc::new(RwLock::new(instance));
		self.live
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.replace(content)
	}

	/// Build a new instance from defaults plus the last snapshot. The result is not cached.
	///
	/// A missing snapshot yields the default instance. A snapshot that is not a valid document is
	/// ignored; it will be overwritten by the next persisted update. Read errors are returned.
	pub async fn load_fresh(&self) -> Result<T, SyncError> {
		let mut instance = T::default();

		let Some(path) = &self.snapshot_path else {
			return Ok(instance);
		};

		let Some(bytes) = self.snapshots.load(path).await? else {
			debug!("No snapshot at {:?}, using default content", path);
			return Ok(instance);
		};

		match parse_document(&bytes) {
			Ok(document) => instance.merge_fields(&document),
			Err(e) => warn!("Ignoring unreadable snapshot {:?}: {}", path, e),
		}
		Ok(instance)
	}
}
