use std::path::{Path, PathBuf};

/// Replace `path` with `bytes` so readers see either the old or the new file, never a prefix.
///
/// The data is written and flushed to a sibling temp file which is then renamed over the target.
/// Missing parent directories are created.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			tokio::fs::create_dir_all(parent).await?;
		}
	}

	let tmp = temp_path(path);
	let mut file = tokio::fs::File::create(&tmp).await?;
	tokio::io::AsyncWriteExt::write_all(&mut file, bytes).await?;
	file.sync_all().await?;
	drop(file);

	if let Err(e) = tokio::fs::rename(&tmp, path).await {
		let _ = tokio::fs::remove_file(&tmp).await;
		return Err(e);
	}
	Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
	let mut name = path
		.file_name()
		.map(|n| n.to_os_string())
		.unwrap_or_default();
	name.push(".tmp");
	path.with_file_name(name)
}
