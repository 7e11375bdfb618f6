use coppy_sync::config::{DEFAULT_CONTENT_HOST, MANIFEST_FILE_NAME};
use coppy_sync::{AppIdentity, ApplyPolicy, ResolverSettings, SyncError, SyncSettings, resolve};
use std::path::PathBuf;
use std::time::Duration;

// ── Resolution ──────────────────────────────────────────────────

#[test]
fn resolve_derives_endpoint_slots_and_snapshot_path() {
	let settings = ResolverSettings::new("/data/app");
	let config = resolve(&AppIdentity::new("abc123", "57"), &settings).unwrap();

	assert_eq!(config.content_key, "abc123");
	assert_eq!(
		config.content_url,
		format!("{}/abc123/content", DEFAULT_CONTENT_HOST)
	);
	assert_eq!(config.saved_validator_key, "coppy-saved-content-abc123");
	assert_eq!(config.applied_validator_key, "coppy-applied-content-abc123");
	assert_eq!(
		config.snapshot_path,
		PathBuf::from("/data/app/coppy.abc123.57.json")
	);
}

#[test]
fn resolve_is_deterministic() {
	let settings = ResolverSettings::new("/data/app");
	let identity = AppIdentity::new("abc123", "57");
	assert_eq!(
		resolve(&identity, &settings).unwrap(),
		resolve(&identity, &settings).unwrap()
	);
}

#[test]
fn app_versions_never_share_a_snapshot() {
	let settings = ResolverSettings::new("/data/app");
	let old = resolve(&AppIdentity::new("abc123", "57"), &settings).unwrap();
	let new = resolve(&AppIdentity::new("abc123", "58"), &settings).unwrap();

	assert_ne!(old.snapshot_path, new.snapshot_path);
	assert_eq!(old.saved_validator_key, new.saved_validator_key);
}

#[test]
fn resolve_trims_trailing_slash_from_host() {
	let settings = ResolverSettings::new("/data").with_content_host("http://localhost:8080/");
	let config = resolve(&AppIdentity::new("k", "1"), &settings).unwrap();
	assert_eq!(config.content_url, "http://localhost:8080/k/content");
}

#[test]
fn resolve_without_content_key_is_config_missing() {
	let identity = AppIdentity {
		content_key: None,
		app_version: Some("1".to_string()),
	};
	let result = resolve(&identity, &ResolverSettings::new("/data"));
	assert!(matches!(result, Err(SyncError::ConfigMissing(_))));
}

#[test]
fn resolve_with_empty_values_is_config_missing() {
	let settings = ResolverSettings::new("/data");
	assert!(matches!(
		resolve(&AppIdentity::new("", "1"), &settings),
		Err(SyncError::ConfigMissing(_))
	));
	assert!(matches!(
		resolve(&AppIdentity::new("k", ""), &settings),
		Err(SyncError::ConfigMissing(_))
	));
}

// ── Manifest ────────────────────────────────────────────────────

#[test]
fn manifest_provides_content_key() {
	let dir = tempfile::tempdir().unwrap();
	let manifest = dir.path().join(MANIFEST_FILE_NAME);
	std::fs::write(&manifest, r#"{"ContentKey": "from-manifest"}"#).unwrap();

	let identity = AppIdentity::from_manifest(&manifest, Some("3".to_string()));
	assert_eq!(identity.content_key.as_deref(), Some("from-manifest"));
	assert_eq!(identity.app_version.as_deref(), Some("3"));
}

#[test]
fn missing_or_invalid_manifest_has_no_key() {
	let dir = tempfile::tempdir().unwrap();
	let missing = AppIdentity::from_manifest(&dir.path().join("absent.json"), None);
	assert!(missing.content_key.is_none());

	let manifest = dir.path().join(MANIFEST_FILE_NAME);
	std::fs::write(&manifest, r#"{"OtherKey": 1}"#).unwrap();
	let invalid = AppIdentity::from_manifest(&manifest, Some("3".to_string()));
	assert!(invalid.content_key.is_none());
	assert!(resolve(&invalid, &ResolverSettings::new("/data")).is_err());
}

// ── Settings ────────────────────────────────────────────────────

#[test]
fn sync_settings_default() {
	let settings = SyncSettings::default();
	assert_eq!(settings.request_timeout, Duration::from_secs(20));
	assert_eq!(settings.sync_budget, Duration::from_secs(25));
	assert_eq!(settings.apply_policy, ApplyPolicy::BackgroundOnly);
	assert!(settings.periodic_interval.is_none());
}
