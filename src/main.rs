use coppy_sync::config::MANIFEST_FILE_NAME;
use coppy_sync::{
	AppIdentity, ContentDocument, Coppy, ExecutionState, MergeableContent, ResolverSettings,
	SyncOutcome, SyncSettings, merge_field,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, info};

/// Content shape used by the command line runner.
#[derive(Debug, Default, Serialize)]
struct DemoContent {
	title: String,
	subtitle: String,
	labels: BTreeMap<String, String>,
}

impl MergeableContent for DemoContent {
	fn merge_fields(&mut self, updates: &ContentDocument) {
		merge_field(&mut self.title, updates, "title");
		merge_field(&mut self.subtitle, updates, "subtitle");
		merge_field(&mut self.labels, updates, "labels");
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	info!("Starting content sync");

	let support_dir = std::env::var("COPPY_SUPPORT_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|_| std::env::temp_dir().join("coppy"));

	// The environment wins over the manifest in the working directory.
	let mut identity = AppIdentity::from_env();
	if identity.content_key.is_none() {
		identity = AppIdentity::from_manifest(
			&PathBuf::from(MANIFEST_FILE_NAME),
			identity.app_version.take(),
		);
	}

	let mut resolver = ResolverSettings::new(support_dir);
	if let Ok(host) = std::env::var("COPPY_CONTENT_HOST") {
		resolver = resolver.with_content_host(host);
	}

	let coppy = match Coppy::<DemoContent>::initialize(
		&identity,
		&resolver,
		SyncSettings::default(),
	)
	.await
	{
		Ok(coppy) => coppy,
		Err(e) => {
			error!("Failed to start content sync: {}", e);
			return;
		}
	};

	// A command line run has nothing on screen, so behave like a backgrounded app.
	coppy.lifecycle().set(ExecutionState::Background);
	let outcome = coppy.check_now().await;

	match &outcome {
		SyncOutcome::Failed(e) => info!("Sync skipped: {}", e),
		other => info!("Sync finished: {:?}", other),
	}

	let content = coppy.content().await;
	let content = content.read().unwrap_or_else(std::sync::PoisonError::into_inner);
	info!("Current content: {:#?}", *content);
}
