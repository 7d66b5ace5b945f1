//! File-backed store implementations.
//!
//! All writes go through [`atomic_write`]: content lands in a sibling
//! temporary file that is then renamed over the target, so a crash never
//! leaves a half-written document behind.

mod document;
mod emergency;
mod fallback;

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

pub use document::FsDocumentStore;
pub use emergency::FsEmergencyBackupStore;
pub use fallback::FsFallbackStore;

/// Writes `bytes` to `path` through a temporary file and rename.
pub async fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
	let tmp = tmp_path(path);
	tokio::fs::write(&tmp, bytes).await?;
	if let Err(err) = tokio::fs::rename(&tmp, path).await {
		let _ = tokio::fs::remove_file(&tmp).await;
		return Err(err);
	}
	Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
	let mut name = path.file_name().map(OsString::from).unwrap_or_default();
	name.push(".tmp");
	path.with_file_name(name)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tmp_path_is_sibling() {
		assert_eq!(tmp_path(Path::new("/data/doc.json")), PathBuf::from("/data/doc.json.tmp"));
	}

	#[tokio::test]
	async fn atomic_write_replaces_content_and_cleans_up() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("doc.json");

		atomic_write(&path, b"first").await.unwrap();
		atomic_write(&path, b"second").await.unwrap();

		assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
		assert!(!tmp_path(&path).exists());
	}
}
