use std::path::{Path, PathBuf};

use async_trait::async_trait;
use scrivo_primitives::ResourceId;
use scrivo_primitives::time::now_millis;
use tracing::{debug, warn};

use super::atomic_write;
use crate::validation::validate_key;
use crate::{BackupError, EmergencyBackup, EmergencyBackupStore};

/// Keeps one pretty-printed JSON file per backup under a dedicated
/// directory.
#[derive(Debug, Clone)]
pub struct FsEmergencyBackupStore {
	dir: PathBuf,
}

impl FsEmergencyBackupStore {
	/// Directory name used under the application data dir.
	pub const DIR_NAME: &'static str = ".emergency_backups";

	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	/// Store rooted at `<data_dir>/.emergency_backups`.
	pub fn in_data_dir(data_dir: &Path) -> Self {
		Self::new(data_dir.join(Self::DIR_NAME))
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn path_for(&self, id: &str) -> Result<PathBuf, BackupError> {
		validate_key(id).map_err(|reason| BackupError::InvalidKey {
			key: id.to_string(),
			reason,
		})?;
		Ok(self.dir.join(format!("{id}.json")))
	}

	async fn load_all(&self) -> Result<Vec<(PathBuf, EmergencyBackup)>, BackupError> {
		let mut entries = match tokio::fs::read_dir(&self.dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(BackupError::io(&self.dir, e)),
		};

		let mut backups = Vec::new();
		while let Some(entry) = entries.next_entry().await.map_err(|e| BackupError::io(&self.dir, e))? {
			let path = entry.path();
			if path.extension().is_none_or(|ext| ext != "json") {
				continue;
			}
			let Ok(raw) = tokio::fs::read_to_string(&path).await else {
				continue;
			};
			match serde_json::from_str::<EmergencyBackup>(&raw) {
				Ok(backup) => backups.push((path, backup)),
				Err(e) => warn!(path = %path.display(), error = %e, "store.backup.unreadable"),
			}
		}
		Ok(backups)
	}

	/// Newest unexpired backup for `resource`.
	pub async fn latest_for(&self, resource: &ResourceId) -> Result<Option<EmergencyBackup>, BackupError> {
		let now = now_millis();
		Ok(self
			.load_all()
			.await?
			.into_iter()
			.map(|(_, backup)| backup)
			.filter(|b| &b.resource_id == resource && !b.is_expired_at(now))
			.max_by_key(|b| b.timestamp))
	}

	/// Deletes one backup by id. Missing backups are ignored.
	pub async fn delete(&self, id: &str) -> Result<(), BackupError> {
		let path = self.path_for(id)?;
		match tokio::fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(BackupError::io(&path, e)),
		}
	}

	/// Removes every expired backup, returning how many were deleted.
	pub async fn cleanup_expired(&self) -> Result<usize, BackupError> {
		let now = now_millis();
		let mut cleaned = 0;
		for (path, backup) in self.load_all().await? {
			if backup.is_expired_at(now) && tokio::fs::remove_file(&path).await.is_ok() {
				cleaned += 1;
			}
		}
		debug!(cleaned, "store.backup.cleanup");
		Ok(cleaned)
	}
}

#[async_trait]
impl EmergencyBackupStore for FsEmergencyBackupStore {
	async fn write(&self, backup: &EmergencyBackup) -> Result<(), BackupError> {
		let path = self.path_for(&backup.id)?;
		tokio::fs::create_dir_all(&self.dir)
			.await
			.map_err(|e| BackupError::io(&self.dir, e))?;
		let json = serde_json::to_string_pretty(backup)?;
		atomic_write(&path, json.as_bytes())
			.await
			.map_err(|e| BackupError::io(&path, e))?;
		Ok(())
	}
}
