//! End-to-end saves through the file-backed stores.

use std::sync::Arc;
use std::time::Duration;

use scrivo_primitives::{ResourceId, SaveStatus};
use scrivo_save::{BackupTier, BufferSurface, EditorStateTracker, FileStores, SaveConfig, SaveError, SaveOutcome};
use scrivo_store::fallback_key;

fn config(dir: &tempfile::TempDir, max_document_bytes: usize) -> SaveConfig {
	SaveConfig {
		debounce_ms: 20,
		backup_ttl_hours: 1,
		max_document_bytes,
		data_dir: Some(dir.path().to_path_buf()),
	}
}

async fn wait_for_status(tracker: &EditorStateTracker, want: SaveStatus) {
	tokio::time::timeout(Duration::from_secs(5), async {
		while tracker.status().status != want {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	})
	.await
	.unwrap_or_else(|_| panic!("timed out waiting for {want}"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn autosave_reaches_disk() {
	let dir = tempfile::tempdir().unwrap();
	let config = config(&dir, 1024);
	let stores = FileStores::from_config(&config).unwrap();
	let id = ResourceId::from("chapter-1");
	stores.documents.create(&id, "").await.unwrap();

	let surface = Arc::new(BufferSurface::new(""));
	let tracker = EditorStateTracker::attach(id.clone(), surface.clone(), stores.coordinator(&config), config.debounce());

	surface.set_content("It was a dark and stormy night.");
	wait_for_status(&tracker, SaveStatus::Saved).await;

	assert_eq!(stores.documents.read(&id).await.unwrap(), "It was a dark and stormy night.");
	assert!(tracker.status().last_saved_at.is_some());
	tracker.destroy();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deleted_document_is_not_recreated() {
	let dir = tempfile::tempdir().unwrap();
	let config = config(&dir, 1024);
	let stores = FileStores::from_config(&config).unwrap();
	let coordinator = stores.coordinator(&config);
	let id = ResourceId::from("chapter-2");
	stores.documents.create(&id, "v1").await.unwrap();
	stores.documents.delete(&id).await.unwrap();

	let outcome = coordinator.schedule_save(id.clone(), || "v2".to_string()).await.unwrap();
	assert_eq!(outcome, SaveOutcome::ResourceGone);
	assert!(!stores.documents.exists(&id).await.unwrap());

	// Recreated under the same id: saves resume once the cancellation is cleared.
	stores.documents.create(&id, "v3").await.unwrap();
	assert_eq!(
		coordinator.schedule_save(id.clone(), || "v4".to_string()).await.unwrap(),
		SaveOutcome::Skipped
	);
	coordinator.clear_cancelled(&id);
	coordinator.schedule_save(id.clone(), || "v5".to_string()).await.unwrap();
	assert_eq!(stores.documents.read(&id).await.unwrap(), "v5");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejected_write_lands_in_emergency_backup() {
	let dir = tempfile::tempdir().unwrap();
	let config = config(&dir, 8);
	let stores = FileStores::from_config(&config).unwrap();
	let id = ResourceId::from("chapter-3");
	stores.documents.create(&id, "short").await.unwrap();

	let surface = Arc::new(BufferSurface::new("short"));
	let tracker = EditorStateTracker::attach(id.clone(), surface.clone(), stores.coordinator(&config), config.debounce());

	surface.set_content("far too long for the store");
	let err = tracker.flush().await.unwrap_err();

	assert!(matches!(err, SaveError::Write { recovered: Some(BackupTier::Emergency), .. }), "{err}");
	assert_eq!(tracker.status().status, SaveStatus::Error);
	assert_eq!(stores.documents.read(&id).await.unwrap(), "short");

	let backup = stores.backups.latest_for(&id).await.unwrap().expect("backup written");
	assert_eq!(backup.content, "far too long for the store");
	assert_eq!(backup.expires_at - backup.timestamp, 3_600_000);
	assert_eq!(stores.fallback.get(&fallback_key(&id)).await.unwrap(), None);
}
