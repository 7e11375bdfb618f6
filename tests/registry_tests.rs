mod common;

use common::TestContent;
use coppy_sync::{ContentRegistry, FileSnapshotStore};
use serde_json::json;
use std::sync::Arc;

fn registry(dir: &tempfile::TempDir) -> (ContentRegistry<TestContent>, std::path::PathBuf) {
	let path = dir.path().join("coppy.site.100.json");
	(
		ContentRegistry::new(Arc::new(FileSnapshotStore::new()), Some(path.clone())),
		path,
	)
}

#[tokio::test]
async fn first_access_without_snapshot_is_default() {
	let dir = tempfile::tempdir().unwrap();
	let (registry, _) = registry(&dir);

	assert!(registry.current().is_none());
	let content = registry.get_or_load().await;
	assert_eq!(*content.read().unwrap(), TestContent::default());
}

#[tokio::test]
async fn get_or_load_returns_the_same_instance() {
	let dir = tempfile::tempdir().unwrap();
	let (registry, _) = registry(&dir);

	let first = registry.get_or_load().await;
	let second = registry.get_or_load().await;
	assert!(Arc::ptr_eq(&first, &second));
	assert!(Arc::ptr_eq(&first, &registry.current().unwrap()));
}

#[tokio::test]
async fn first_access_merges_snapshot_onto_default() {
	let dir = tempfile::tempdir().unwrap();
	let (registry, path) = registry(&dir);
	std::fs::write(&path, json!({"title": "Saved", "count": 4}).to_string()).unwrap();

	let content = registry.get_or_load().await;
	let content = content.read().unwrap();
	assert_eq!(content.title, "Saved");
	assert_eq!(content.count, 4);
	assert_eq!(content.subtitle, "");
}

#[tokio::test]
async fn corrupt_snapshot_falls_back_to_default() {
	let dir = tempfile::tempdir().unwrap();
	let (registry, path) = registry(&dir);
	std::fs::write(&path, "[not an object]").unwrap();

	let content = registry.get_or_load().await;
	assert_eq!(*content.read().unwrap(), TestContent::default());
}

#[tokio::test]
async fn unconfigured_registry_serves_defaults() {
	let registry: ContentRegistry<TestContent> =
		ContentRegistry::new(Arc::new(FileSnapshotStore::new()), None);
	let content = registry.get_or_load().await;
	assert_eq!(*content.read().unwrap(), TestContent::default());
}

#[tokio::test]
async fn replace_supersedes_but_old_handles_keep_reading() {
	let dir = tempfile::tempdir().unwrap();
	let (registry, _) = registry(&dir);

	let old = registry.get_or_load().await;
	let previous = registry.replace(TestContent {
		title: "Replaced".to_string(),
		..Default::default()
	});

	assert!(Arc::ptr_eq(&old, &previous.unwrap()));
	assert_eq!(old.read().unwrap().title, "");
	assert_eq!(registry.get_or_load().await.read().unwrap().title, "Replaced");
}

#[tokio::test]
async fn load_fresh_is_never_cached() {
	let dir = tempfile::tempdir().unwrap();
	let (registry, path) = registry(&dir);

	let live = registry.get_or_load().await;
	std::fs::write(&path, json!({"title": "On disk"}).to_string()).unwrap();

	let fresh = registry.load_fresh().await.unwrap();
	assert_eq!(fresh.title, "On disk");
	assert_eq!(live.read().unwrap().title, "");
	assert!(Arc::ptr_eq(&live, &registry.current().unwrap()));
}
