#![allow(dead_code)]

use coppy_sync::{
	AppIdentity, ContentDocument, Coppy, CoppyConfig, ExecutionState, FileSnapshotStore,
	FileValidatorStore, HttpContentSource, LifecycleState, MemoryValidatorStore, MergeableContent, ResolverSettings,
	SyncSettings, Validator, ValidatorStore, merge_field, resolve,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CONTENT_KEY: &str = "site";
pub const CONTENT_PATH: &str = "/site/content";

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TestContent {
	pub title: String,
	pub subtitle: String,
	pub count: u32,
}

impl MergeableContent for TestContent {
	fn merge_fields(&mut self, updates: &ContentDocument) {
		merge_field(&mut self.title, updates, "title");
		merge_field(&mut self.subtitle, updates, "subtitle");
		merge_field(&mut self.count, updates, "count");
	}
}

pub fn document(value: Value) -> ContentDocument {
	match value {
		Value::Object(map) => map,
		other => panic!("expected an object, got {other}"),
	}
}

pub fn test_config(dir: &TempDir, host: &str) -> CoppyConfig {
	resolve(
		&AppIdentity::new(CONTENT_KEY, "100"),
		&ResolverSettings::new(dir.path()).with_content_host(host),
	)
	.unwrap()
}

pub fn fast_settings() -> SyncSettings {
	SyncSettings {
		request_timeout: Duration::from_secs(5),
		sync_budget: Duration::from_secs(10),
		..Default::default()
	}
}

/// Mock endpoint, temp support directory and an assembled `Coppy`.
pub struct Harness {
	pub server: MockServer,
	pub dir: TempDir,
	pub config: CoppyConfig,
	pub validators: Arc<dyn ValidatorStore>,
	pub lifecycle: Arc<LifecycleState>,
	pub coppy: Coppy<TestContent>,
}

impl Harness {
	pub async fn new(state: ExecutionState) -> Self {
		Self::with(state, fast_settings(), Arc::new(MemoryValidatorStore::new())).await
	}

	pub async fn with(
		state: ExecutionState,
		settings: SyncSettings,
		validators: Arc<dyn ValidatorStore>,
	) -> Self {
		Self::build(state, settings, TempDir::new().unwrap(), validators).await
	}

	/// The production validator store, kept in the support directory.
	pub async fn with_file_validators(state: ExecutionState) -> Self {
		let dir = TempDir::new().unwrap();
		let validators = Arc::new(FileValidatorStore::in_dir(dir.path().to_path_buf()));
		Self::build(state, fast_settings(), dir, validators).await
	}

	async fn build(
		state: ExecutionState,
		settings: SyncSettings,
		dir: TempDir,
		validators: Arc<dyn ValidatorStore>,
	) -> Self {
		let server = MockServer::start().await;
		let config = test_config(&dir, &server.uri());
		let lifecycle = Arc::new(LifecycleState::new(state));
		let source = Arc::new(HttpContentSource::new(settings.request_timeout).unwrap());

		let coppy = Coppy::with_parts(
			Some(config.clone()),
			source,
			validators.clone(),
			Arc::new(FileSnapshotStore::new()),
			lifecycle.clone(),
			settings,
		);

		Self {
			server,
			dir,
			config,
			validators,
			lifecycle,
			coppy,
		}
	}

	pub async fn set_saved(&self, value: &str) {
		self.validators
			.set(&self.config.saved_validator_key, &Validator::from(value))
			.await
			.unwrap();
	}

	pub async fn set_applied(&self, value: &str) {
		self.validators
			.set(&self.config.applied_validator_key, &Validator::from(value))
			.await
			.unwrap();
	}

	pub async fn saved(&self) -> Option<String> {
		self.validators
			.get(&self.config.saved_validator_key)
			.await
			.unwrap()
			.map(|v| v.as_str().to_string())
	}

	pub async fn applied(&self) -> Option<String> {
		self.validators
			.get(&self.config.applied_validator_key)
			.await
			.unwrap()
			.map(|v| v.as_str().to_string())
	}

	pub fn write_snapshot(&self, value: Value) {
		std::fs::write(&self.config.snapshot_path, value.to_string()).unwrap();
	}

	pub fn snapshot(&self) -> Option<Value> {
		std::fs::read(&self.config.snapshot_path)
			.ok()
			.map(|data| serde_json::from_slice(&data).unwrap())
	}

	pub async fn live(&self) -> TestContent {
		let content = self.coppy.content().await;
		let guard = content.read().unwrap();
		guard.clone()
	}

	pub async fn mount_probe(&self, etag: &str) {
		mount_probe(&self.server, etag).await;
	}

	pub async fn mount_get(&self, etag: &str, body: Value, calls: u64) {
		mount_get(&self.server, etag, body, calls).await;
	}
}

pub async fn mount_probe(server: &MockServer, etag: &str) {
	Mock::given(method("HEAD"))
		.and(path(CONTENT_PATH))
		.respond_with(ResponseTemplate::new(200).insert_header("ETag", etag))
		.mount(server)
		.await;
}

/// Mount the document download, expecting exactly `calls` requests.
pub async fn mount_get(server: &MockServer, etag: &str, body: Value, calls: u64) {
	Mock::given(method("GET"))
		.and(path(CONTENT_PATH))
		.respond_with(
			ResponseTemplate::new(200)
				.insert_header("ETag", etag)
				.set_body_json(body),
		)
		.expect(calls)
		.mount(server)
		.await;
}

/// Poll `check` every 20ms until it holds, failing after five seconds.
pub async fn wait_until<F, Fut>(mut check: F)
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = bool>,
{
	let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
	while !check().await {
		assert!(
			tokio::time::Instant::now() < deadline,
			"condition not reached in time"
		);
		tokio::time::sleep(Duration::from_millis(20)).await;
	}
}
