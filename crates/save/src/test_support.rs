//! In-memory stores with failure injection for unit tests.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scrivo_primitives::ResourceId;
use scrivo_store::{BackupError, DocumentStore, EmergencyBackup, EmergencyBackupStore, FallbackStore, StoreError};

use crate::{BackupChain, SaveCoordinator};

#[derive(Default)]
pub(crate) struct MemoryDocumentStore {
	writes: Mutex<Vec<(ResourceId, String)>>,
	gone: Mutex<HashSet<ResourceId>>,
	delay: Mutex<Duration>,
	failing: AtomicBool,
	attempts: AtomicUsize,
	active: AtomicUsize,
	max_active: AtomicUsize,
}

impl MemoryDocumentStore {
	pub fn with_delay(delay: Duration) -> Self {
		let store = Self::default();
		*store.delay.lock() = delay;
		store
	}

	pub fn fail_writes(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	pub fn mark_gone(&self, resource: &ResourceId) {
		self.gone.lock().insert(resource.clone());
	}

	pub fn writes(&self) -> Vec<(ResourceId, String)> {
		self.writes.lock().clone()
	}

	pub fn contents_for(&self, resource: &ResourceId) -> Vec<String> {
		self.writes
			.lock()
			.iter()
			.filter(|(id, _)| id == resource)
			.map(|(_, content)| content.clone())
			.collect()
	}

	pub fn attempts(&self) -> usize {
		self.attempts.load(Ordering::SeqCst)
	}

	pub fn active(&self) -> usize {
		self.active.load(Ordering::SeqCst)
	}

	pub fn max_active(&self) -> usize {
		self.max_active.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
	async fn write(&self, resource: &ResourceId, content: &str) -> Result<(), StoreError> {
		self.attempts.fetch_add(1, Ordering::SeqCst);
		let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
		self.max_active.fetch_max(active, Ordering::SeqCst);

		// Failure mode is decided when the write starts.
		let gone = self.gone.lock().contains(resource);
		let failing = self.failing.load(Ordering::SeqCst);
		let delay = *self.delay.lock();
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		self.active.fetch_sub(1, Ordering::SeqCst);

		if gone {
			return Err(StoreError::NotFound {
				resource: resource.clone(),
			});
		}
		if failing {
			return Err(StoreError::Backend("disk full".to_string()));
		}
		self.writes.lock().push((resource.clone(), content.to_string()));
		Ok(())
	}
}

#[derive(Default)]
pub(crate) struct MemoryBackupStore {
	backups: Mutex<Vec<EmergencyBackup>>,
	failing: AtomicBool,
	attempts: AtomicUsize,
}

impl MemoryBackupStore {
	pub fn failing() -> Self {
		let store = Self::default();
		store.failing.store(true, Ordering::SeqCst);
		store
	}

	pub fn backups(&self) -> Vec<EmergencyBackup> {
		self.backups.lock().clone()
	}

	pub fn attempts(&self) -> usize {
		self.attempts.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl EmergencyBackupStore for MemoryBackupStore {
	async fn write(&self, backup: &EmergencyBackup) -> Result<(), BackupError> {
		self.attempts.fetch_add(1, Ordering::SeqCst);
		if self.failing.load(Ordering::SeqCst) {
			return Err(BackupError::Backend("backup volume offline".to_string()));
		}
		self.backups.lock().push(backup.clone());
		Ok(())
	}
}

#[derive(Default)]
pub(crate) struct MemoryFallbackStore {
	entries: Mutex<Vec<(String, String)>>,
	failing: AtomicBool,
}

impl MemoryFallbackStore {
	pub fn failing() -> Self {
		let store = Self::default();
		store.failing.store(true, Ordering::SeqCst);
		store
	}

	pub fn entries(&self) -> Vec<(String, String)> {
		self.entries.lock().clone()
	}
}

#[async_trait]
impl FallbackStore for MemoryFallbackStore {
	async fn put(&self, key: &str, value: &str) -> Result<(), BackupError> {
		if self.failing.load(Ordering::SeqCst) {
			return Err(BackupError::Backend("quota exceeded".to_string()));
		}
		self.entries.lock().push((key.to_string(), value.to_string()));
		Ok(())
	}
}

/// A coordinator wired to in-memory stores.
pub(crate) struct Harness {
	pub store: Arc<MemoryDocumentStore>,
	pub backups: Arc<MemoryBackupStore>,
	pub fallback: Arc<MemoryFallbackStore>,
	pub coordinator: SaveCoordinator,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_stores(MemoryDocumentStore::default(), MemoryBackupStore::default(), MemoryFallbackStore::default())
	}

	pub fn with_store_delay(delay: Duration) -> Self {
		Self::with_stores(
			MemoryDocumentStore::with_delay(delay),
			MemoryBackupStore::default(),
			MemoryFallbackStore::default(),
		)
	}

	pub fn with_stores(store: MemoryDocumentStore, backups: MemoryBackupStore, fallback: MemoryFallbackStore) -> Self {
		let store = Arc::new(store);
		let backups = Arc::new(backups);
		let fallback = Arc::new(fallback);
		let coordinator = SaveCoordinator::new(store.clone(), BackupChain::new(backups.clone(), fallback.clone()));
		Self {
			store,
			backups,
			fallback,
			coordinator,
		}
	}
}

/// Polls `condition` until it holds, advancing (possibly paused) time in
/// small steps.
pub(crate) async fn wait_until<F>(name: &str, mut condition: F)
where
	F: FnMut() -> bool,
{
	tokio::time::timeout(Duration::from_secs(5), async move {
		loop {
			if condition() {
				return;
			}
			tokio::time::sleep(Duration::from_millis(1)).await;
		}
	})
	.await
	.unwrap_or_else(|_| panic!("timed out waiting for {name}"));
}
