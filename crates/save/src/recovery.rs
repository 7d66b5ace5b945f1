//! Backup tiers run after a failed primary write.
//!
//! The chain is: emergency backup store, then local fallback store. Failures
//! in either tier are logged and swallowed; the caller still reports the
//! original write failure.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use scrivo_primitives::ResourceId;
use scrivo_store::{EmergencyBackup, EmergencyBackupStore, FallbackStore, fallback_key};
use serde::Serialize;
use tracing::{error, info, warn};

/// How long emergency backups stay valid by default.
pub const DEFAULT_BACKUP_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Where a failed save's content ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackupTier {
	Emergency,
	LocalFallback,
}

impl fmt::Display for BackupTier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Emergency => "emergency backup",
			Self::LocalFallback => "local fallback",
		})
	}
}

#[derive(Clone)]
pub struct BackupChain {
	emergency: Arc<dyn EmergencyBackupStore>,
	fallback: Arc<dyn FallbackStore>,
	ttl: Duration,
}

impl fmt::Debug for BackupChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BackupChain").field("ttl", &self.ttl).finish_non_exhaustive()
	}
}

impl BackupChain {
	pub fn new(emergency: Arc<dyn EmergencyBackupStore>, fallback: Arc<dyn FallbackStore>) -> Self {
		Self {
			emergency,
			fallback,
			ttl: DEFAULT_BACKUP_TTL,
		}
	}

	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;
		self
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Writes `content` to the first tier that accepts it.
	pub async fn secure(&self, resource: &ResourceId, content: &str) -> Option<BackupTier> {
		let backup = EmergencyBackup::new(resource, content, self.ttl);

		match self.emergency.write(&backup).await {
			Ok(()) => {
				info!(resource = %resource, backup = %backup.id, "save.backup.emergency");
				return Some(BackupTier::Emergency);
			}
			Err(e) => warn!(resource = %resource, error = %e, "save.backup.emergency_failed"),
		}

		let payload = match serde_json::to_string(&backup) {
			Ok(payload) => payload,
			Err(e) => {
				error!(resource = %resource, error = %e, "save.backup.encode_failed");
				return None;
			}
		};

		match self.fallback.put(&fallback_key(resource), &payload).await {
			Ok(()) => {
				info!(resource = %resource, "save.backup.local_fallback");
				Some(BackupTier::LocalFallback)
			}
			Err(e) => {
				error!(resource = %resource, error = %e, "save.backup.lost");
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::test_support::{MemoryBackupStore, MemoryFallbackStore};

	fn chain(backups: &Arc<MemoryBackupStore>, fallback: &Arc<MemoryFallbackStore>) -> BackupChain {
		BackupChain::new(backups.clone(), fallback.clone()).with_ttl(Duration::from_secs(60))
	}

	#[tokio::test]
	async fn emergency_tier_wins_when_available() {
		let backups = Arc::new(MemoryBackupStore::default());
		let fallback = Arc::new(MemoryFallbackStore::default());
		let id = ResourceId::from("s1");

		assert_eq!(chain(&backups, &fallback).secure(&id, "draft").await, Some(BackupTier::Emergency));

		let stored = backups.backups();
		assert_eq!(stored.len(), 1);
		assert_eq!(stored[0].content, "draft");
		assert_eq!(stored[0].expires_at - stored[0].timestamp, 60_000);
		assert!(fallback.entries().is_empty());
	}

	#[tokio::test]
	async fn falls_back_to_local_store() {
		let backups = Arc::new(MemoryBackupStore::failing());
		let fallback = Arc::new(MemoryFallbackStore::default());
		let id = ResourceId::from("s1");

		assert_eq!(chain(&backups, &fallback).secure(&id, "draft").await, Some(BackupTier::LocalFallback));

		let entries = fallback.entries();
		assert_eq!(entries.len(), 1);
		assert_eq!(entries[0].0, "emergency_backup_s1");
		let decoded: EmergencyBackup = serde_json::from_str(&entries[0].1).unwrap();
		assert_eq!(decoded.content, "draft");
	}

	#[tokio::test]
	async fn both_tiers_failing_yields_none() {
		let backups = Arc::new(MemoryBackupStore::failing());
		let fallback = Arc::new(MemoryFallbackStore::failing());
		assert_eq!(chain(&backups, &fallback).secure(&ResourceId::from("s1"), "draft").await, None);
	}
}
