use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use scrivo_primitives::ResourceId;
use tokio::sync::Mutex;
use tracing::debug;

use super::atomic_write;
use crate::validation::validate_key;
use crate::{DocumentStore, StoreError};

/// Stores each document as `<root>/<resource>.json`.
///
/// [`DocumentStore::write`] only replaces existing documents; a missing
/// file is reported as [`StoreError::NotFound`]. Documents are brought into
/// existence with [`FsDocumentStore::create`].
///
/// Mutations through one store (and its clones) are serialized, so a
/// [`FsDocumentStore::delete`] can never land between the existence check
/// and the rename of a write and have the rename bring the file back.
/// Other processes touching the directory are not covered.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
	root: PathBuf,
	max_bytes: usize,
	mutations: Arc<Mutex<()>>,
}

impl FsDocumentStore {
	/// Default size limit for one document (10 MiB).
	pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			max_bytes: Self::DEFAULT_MAX_BYTES,
			mutations: Arc::new(Mutex::new(())),
		}
	}

	pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
		self.max_bytes = max_bytes;
		self
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn path_for(&self, resource: &ResourceId) -> Result<PathBuf, StoreError> {
		validate_key(resource.as_str()).map_err(|reason| StoreError::InvalidResourceId {
			resource: resource.clone(),
			reason,
		})?;
		Ok(self.root.join(format!("{resource}.json")))
	}

	fn check_size(&self, resource: &ResourceId, content: &str) -> Result<(), StoreError> {
		if content.len() > self.max_bytes {
			return Err(StoreError::TooLarge {
				resource: resource.clone(),
				size: content.len(),
				limit: self.max_bytes,
			});
		}
		Ok(())
	}

	pub async fn exists(&self, resource: &ResourceId) -> Result<bool, StoreError> {
		let path = self.path_for(resource)?;
		tokio::fs::try_exists(&path).await.map_err(|e| StoreError::io(&path, e))
	}

	/// Creates or overwrites a document.
	pub async fn create(&self, resource: &ResourceId, content: &str) -> Result<(), StoreError> {
		self.check_size(resource, content)?;
		let path = self.path_for(resource)?;
		let _mutation = self.mutations.lock().await;
		tokio::fs::create_dir_all(&self.root)
			.await
			.map_err(|e| StoreError::io(&self.root, e))?;
		atomic_write(&path, content.as_bytes())
			.await
			.map_err(|e| StoreError::io(&path, e))?;
		debug!(resource = %resource, "store.document.created");
		Ok(())
	}

	pub async fn read(&self, resource: &ResourceId) -> Result<String, StoreError> {
		let path = self.path_for(resource)?;
		match tokio::fs::read_to_string(&path).await {
			Ok(content) => Ok(content),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
				resource: resource.clone(),
			}),
			Err(e) => Err(StoreError::io(&path, e)),
		}
	}

	/// Removes a document. Deleting a missing document is not an error.
	pub async fn delete(&self, resource: &ResourceId) -> Result<(), StoreError> {
		let path = self.path_for(resource)?;
		let _mutation = self.mutations.lock().await;
		match tokio::fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::io(&path, e)),
		}
	}
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
	async fn write(&self, resource: &ResourceId, content: &str) -> Result<(), StoreError> {
		self.check_size(resource, content)?;
		let path = self.path_for(resource)?;
		let _mutation = self.mutations.lock().await;
		if !tokio::fs::try_exists(&path).await.map_err(|e| StoreError::io(&path, e))? {
			return Err(StoreError::NotFound {
				resource: resource.clone(),
			});
		}
		atomic_write(&path, content.as_bytes())
			.await
			.map_err(|e| StoreError::io(&path, e))?;
		debug!(resource = %resource, bytes = content.len(), "store.document.written");
		Ok(())
	}
}
