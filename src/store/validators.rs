use crate::remote::Validator;
use crate::sync::SyncError;
use crate::utils::write_atomic;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Durable string slots holding the `saved` and `applied` validators.
///
/// The store gives no concurrency guarantee of its own; the engine serialises access per content
/// key.
#[async_trait::async_trait]
pub trait ValidatorStore: Send + Sync {
	async fn get(&self, key: &str) -> Result<Option<Validator>, SyncError>;
	async fn set(&self, key: &str, value: &Validator) -> Result<(), SyncError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ValidatorFile {
	#[serde(default)]
	values: BTreeMap<String, String>,
	#[serde(default)]
	updated_at: Option<String>,
}

/// File-based implementation of ValidatorStore
///
/// All slots live in one JSON file which is rewritten atomically on every `set`.
pub struct FileValidatorStore {
	path: PathBuf,
	write_lock: tokio::sync::Mutex<()>,
}

impl FileValidatorStore {
	pub const FILE_NAME: &'static str = "coppy-validators.json";

	pub fn new(path: PathBuf) -> Self {
		Self {
			path,
			write_lock: tokio::sync::Mutex::new(()),
		}
	}

	/// Store the slots in the standard file inside `support_dir`.
	pub fn in_dir(support_dir: PathBuf) -> Self {
		Self::new(support_dir.join(Self::FILE_NAME))
	}

	/// Read every slot. A file that does not parse counts as empty so the next `set` replaces
	/// it; the cost is one extra download.
	async fn read_file(&self) -> Result<ValidatorFile, SyncError> {
		match tokio::fs::read(&self.path).await {
			Ok(data) => match serde_json::from_slice(&data) {
				Ok(file) => Ok(file),
				Err(e) => {
					warn!(
						"Discarding unreadable validator file {:?}: {}",
						self.path, e
					);
					Ok(ValidatorFile::default())
				}
			},
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ValidatorFile::default()),
			Err(e) => Err(SyncError::StorageFailure(format!(
				"Failed to read validator file: {}",
				e
			))),
		}
	}
}

#[async_trait::async_trait]
impl ValidatorStore for FileValidatorStore {
	async fn get(&self, key: &str) -> Result<Option<Validator>, SyncError> {
		let file = self.read_file().await?;
		Ok(file.values.get(key).cloned().map(Validator::from))
	}

	async fn set(&self, key: &str, value: &Validator) -> Result<(), SyncError> {
		let _guard = self.write_lock.lock().await;

		let mut file = self.read_file().await?;
		file.values
			.insert(key.to_string(), value.as_str().to_string());
		file.updated_at = Some(chrono::Utc::now().to_rfc3339());

		let content = serde_json::to_vec_pretty(&file).map_err(|e| {
			SyncError::SerializationFailure(format!("Failed to serialize validator file: {}", e))
		})?;

		write_atomic(&self.path, &content).await.map_err(|e| {
			SyncError::StorageFailure(format!("Failed to write validator file: {}", e))
		})?;

		debug!("Stored validator {} = {}", key, value);
		Ok(())
	}
}

/// In-memory implementation of ValidatorStore, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryValidatorStore {
	values: Mutex<HashMap<String, Validator>>,
}

impl MemoryValidatorStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Validator>> {
		self.values
			.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner)
	}
}

#[async_trait::async_trait]
impl ValidatorStore for MemoryValidatorStore {
	async fn get(&self, key: &str) -> Result<Option<Validator>, SyncError> {
		Ok(self.lock().get(key).cloned())
	}

	async fn set(&self, key: &str, value: &Validator) -> Result<(), SyncError> {
		self.lock().insert(key.to_string(), value.clone());
		Ok(())
	}
}
