use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use scrivo_primitives::SaveStatus;
use serde::Serialize;

use crate::recovery::BackupTier;

/// Point-in-time view of a tracker's save state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
	pub status: SaveStatus,
	pub is_dirty: bool,
	pub is_saving: bool,
	pub last_saved_at: Option<DateTime<Utc>>,
	/// Backup tier holding the content of the most recent failed save.
	/// Cleared by the next successful save.
	pub recovered_by: Option<BackupTier>,
}

pub(crate) type StatusListener = Arc<dyn Fn(&StatusSnapshot) + Send + Sync>;

#[derive(Default)]
pub(crate) struct StatusListeners {
	next_id: AtomicU64,
	entries: Mutex<Vec<(u64, StatusListener)>>,
}

impl StatusListeners {
	pub fn add(&self, listener: StatusListener) -> u64 {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		self.entries.lock().push((id, listener));
		id
	}

	pub fn remove(&self, id: u64) -> bool {
		let mut entries = self.entries.lock();
		let before = entries.len();
		entries.retain(|(entry, _)| *entry != id);
		entries.len() != before
	}

	pub fn clear(&self) {
		self.entries.lock().clear();
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Calls every listener outside of the registry lock.
	pub fn notify(&self, snapshot: &StatusSnapshot) {
		let listeners: Vec<_> = self.entries.lock().iter().map(|(_, l)| Arc::clone(l)).collect();
		for listener in listeners {
			listener(snapshot);
		}
	}
}
