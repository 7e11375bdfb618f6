//! Configuration for content sync.
//!
//! Resolves everything the engine needs from the app's static identity: the remote endpoint, the
//! two validator slot names and the snapshot path. Resolution is pure given its inputs, so the same
//! identity always yields the same configuration.

use crate::sync::SyncError;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Host serving published content documents.
pub const DEFAULT_CONTENT_HOST: &str = "https://content.coppy.app";

/// File name of the manifest carrying the published content key.
pub const MANIFEST_FILE_NAME: &str = "Coppy.json";

/// Environment variable naming the content key.
pub const CONTENT_KEY_ENV: &str = "COPPY_CONTENT_KEY";

/// Environment variable naming the app build/version identifier.
pub const APP_VERSION_ENV: &str = "COPPY_APP_VERSION";

#[derive(Debug, Deserialize)]
struct ManifestRoot {
	#[serde(rename = "ContentKey")]
	content_key: String,
}

/// Static identity of the running app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppIdentity {
	pub content_key: Option<String>,
	pub app_version: Option<String>,
}

impl AppIdentity {
	pub fn new(content_key: impl Into<String>, app_version: impl Into<String>) -> Self {
		Self {
			content_key: Some(content_key.into()),
			app_version: Some(app_version.into()),
		}
	}

	/// Read the content key from a JSON manifest (`{"ContentKey": "..."}`).
	///
	/// A missing or unreadable manifest yields an identity without a key rather than an error;
	/// [`resolve`] reports the absence.
	pub fn from_manifest(path: &Path, app_version: Option<String>) -> Self {
		let content_key = std::fs::read(path)
			.ok()
			.and_then(|data| serde_json::from_slice::<ManifestRoot>(&data).ok())
			.map(|root| root.content_key);

		if content_key.is_none() {
			debug!("No usable content key in manifest {:?}", path);
		}

		Self {
			content_key,
			app_version,
		}
	}

	/// Read both values from `COPPY_CONTENT_KEY` and `COPPY_APP_VERSION`.
	pub fn from_env() -> Self {
		Self {
			content_key: std::env::var(CONTENT_KEY_ENV).ok(),
			app_version: std::env::var(APP_VERSION_ENV).ok(),
		}
	}
}

/// Where content comes from and where it is kept locally.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
	/// Base URL of the content host, without a trailing slash.
	pub content_host: String,
	/// Directory holding snapshots and the validator file.
	pub support_dir: PathBuf,
}

impl ResolverSettings {
	pub fn new(support_dir: impl Into<PathBuf>) -> Self {
		Self {
			content_host: DEFAULT_CONTENT_HOST.to_string(),
			support_dir: support_dir.into(),
		}
	}

	pub fn with_content_host(mut self, host: impl Into<String>) -> Self {
		self.content_host = host.into();
		self
	}
}

/// Fully resolved configuration for one content key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoppyConfig {
	pub content_key: String,
	pub content_url: String,
	pub saved_validator_key: String,
	pub applied_validator_key: String,
	pub snapshot_path: PathBuf,
}

/// Derive the sync configuration from the app identity.
///
/// Fails with [`SyncError::ConfigMissing`] when the content key or the app version is absent or
/// empty. Callers skip sync in that case.
pub fn resolve(
	identity: &AppIdentity,
	settings: &ResolverSettings,
) -> Result<CoppyConfig, SyncError> {
	let key = identity
		.content_key
		.as_deref()
		.filter(|k| !k.is_empty())
		.ok_or_else(|| SyncError::ConfigMissing("content key is not published".to_string()))?;

	let app_version = identity
		.app_version
		.as_deref()
		.filter(|v| !v.is_empty())
		.ok_or_else(|| SyncError::ConfigMissing("app version is not available".to_string()))?;

	let host = settings.content_host.trim_end_matches('/');

	// Snapshots are per app version so an upgrade never reads an older build's file.
	let snapshot_path = settings
		.support_dir
		.join(format!("coppy.{}.{}.json", key, app_version));

	Ok(CoppyConfig {
		content_key: key.to_string(),
		content_url: format!("{}/{}/content", host, key),
		saved_validator_key: format!("coppy-saved-content-{}", key),
		applied_validator_key: format!("coppy-applied-content-{}", key),
		snapshot_path,
	})
}

/// When downloaded updates may be merged into the live instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyPolicy {
	/// Merge into the live instance only while the app is in the background; in the
	/// foreground the update is persisted and picked up by a later trigger or the next launch.
	#[default]
	BackgroundOnly,
	/// Merge into the live instance whatever the execution state.
	Immediate,
}

/// Configuration for sync attempts
#[derive(Debug, Clone)]
pub struct SyncSettings {
	/// Timeout for each HTTP request
	pub request_timeout: Duration,
	/// Upper bound for a whole sync attempt started by a trigger
	pub sync_budget: Duration,
	pub apply_policy: ApplyPolicy,
	/// Run a check on this interval when `spawn_periodic` is used
	pub periodic_interval: Option<Duration>,
}

impl Default for SyncSettings {
	fn default() -> Self {
		Self {
			request_timeout: Duration::from_secs(20),
			sync_budget: Duration::from_secs(25),
			apply_policy: ApplyPolicy::BackgroundOnly,
			periodic_interval: None,
		}
	}
}
