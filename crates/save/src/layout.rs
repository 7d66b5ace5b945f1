//! File-backed store wiring under one data directory.
//!
//! ```text
//! <data-dir>/
//!   documents/<resource>.json
//!   .emergency_backups/<resource>-<timestamp>.json
//!   fallback/emergency_backup_<resource>
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scrivo_store::{FsDocumentStore, FsEmergencyBackupStore, FsFallbackStore};

use crate::config::{self, SaveConfig};
use crate::coordinator::SaveCoordinator;
use crate::recovery::BackupChain;

/// The three file stores rooted at one data directory.
#[derive(Debug, Clone)]
pub struct FileStores {
	pub data_dir: PathBuf,
	pub documents: Arc<FsDocumentStore>,
	pub backups: Arc<FsEmergencyBackupStore>,
	pub fallback: Arc<FsFallbackStore>,
}

impl FileStores {
	pub const DOCUMENTS_DIR: &'static str = "documents";

	pub fn new(data_dir: &Path, max_document_bytes: usize) -> Self {
		Self {
			data_dir: data_dir.to_path_buf(),
			documents: Arc::new(
				FsDocumentStore::new(data_dir.join(Self::DOCUMENTS_DIR)).with_max_bytes(max_document_bytes),
			),
			backups: Arc::new(FsEmergencyBackupStore::in_data_dir(data_dir)),
			fallback: Arc::new(FsFallbackStore::in_data_dir(data_dir)),
		}
	}

	pub fn from_config(config: &SaveConfig) -> config::Result<Self> {
		Ok(Self::new(&config.data_dir()?, config.max_document_bytes))
	}

	/// A coordinator writing to these stores.
	pub fn coordinator(&self, config: &SaveConfig) -> SaveCoordinator {
		let chain = BackupChain::new(self.backups.clone(), self.fallback.clone()).with_ttl(config.backup_ttl());
		SaveCoordinator::new(self.documents.clone(), chain)
	}
}
