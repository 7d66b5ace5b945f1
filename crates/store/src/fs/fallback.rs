use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::atomic_write;
use crate::validation::validate_key;
use crate::{BackupError, FallbackStore};

/// Key/value store with one file per key.
#[derive(Debug, Clone)]
pub struct FsFallbackStore {
	dir: PathBuf,
}

impl FsFallbackStore {
	pub const DIR_NAME: &'static str = "fallback";

	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn in_data_dir(data_dir: &Path) -> Self {
		Self::new(data_dir.join(Self::DIR_NAME))
	}

	fn path_for(&self, key: &str) -> Result<PathBuf, BackupError> {
		validate_key(key).map_err(|reason| BackupError::InvalidKey {
			key: key.to_string(),
			reason,
		})?;
		Ok(self.dir.join(key))
	}

	pub async fn get(&self, key: &str) -> Result<Option<String>, BackupError> {
		let path = self.path_for(key)?;
		match tokio::fs::read_to_string(&path).await {
			Ok(value) => Ok(Some(value)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(BackupError::io(&path, e)),
		}
	}
}

#[async_trait]
impl FallbackStore for FsFallbackStore {
	async fn put(&self, key: &str, value: &str) -> Result<(), BackupError> {
		let path = self.path_for(key)?;
		tokio::fs::create_dir_all(&self.dir)
			.await
			.map_err(|e| BackupError::io(&self.dir, e))?;
		atomic_write(&path, value.as_bytes())
			.await
			.map_err(|e| BackupError::io(&path, e))
	}
}
