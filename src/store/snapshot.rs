use crate::sync::SyncError;
use crate::utils::write_atomic;

use std::path::Path;
use tracing::info;

/// Durable storage for the last content document.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
	/// Read the snapshot at `path`, `None` when nothing has been written yet.
	async fn load(&self, path: &Path) -> Result<Option<Vec<u8>>, SyncError>;

	/// Replace the snapshot at `path` with `bytes`. Readers never observe a partial write.
	async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), SyncError>;
}

/// File-based implementation of SnapshotStore
#[derive(Debug, Default, Clone)]
pub struct FileSnapshotStore;

impl FileSnapshotStore {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait::async_trait]
impl SnapshotStore for FileSnapshotStore {
	async fn load(&self, path: &Path) -> Result<Option<Vec<u8>>, SyncError> {
		match tokio::fs::read(path).await {
			Ok(data) => Ok(Some(data)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(SyncError::StorageFailure(format!(
				"Failed to read snapshot {:?}: {}",
				path, e
			))),
		}
	}

	async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), SyncError> {
		write_atomic(path, bytes).await.map_err(|e| {
			SyncError::StorageFailure(format!("Failed to write snapshot {:?}: {}", path, e))
		})?;

		info!("Saved content snapshot to {:?} ({} bytes)", path, bytes.len());
		Ok(())
	}
}
