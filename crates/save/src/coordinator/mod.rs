//! Per-resource save serialization.
//!
//! [`SaveCoordinator`] keeps at most one in-flight save entry per
//! [`ResourceId`]. Scheduling a save registers a new entry synchronously and
//! chains it behind the previous entry's completion signal, so saves for one
//! resource run one at a time in request order while different resources
//! proceed independently.
//!
//! # Completion
//!
//! Each task owns a [`CompletionGuard`]. Dropping the guard (normal return,
//! panic, or runtime shutdown) unregisters the entry if it is still the
//! current one for its resource and wakes the next task in the chain.
//!
//! # Cancellation
//!
//! Cancellation is advisory: [`SaveCoordinator::cancel_pending_saves`]
//! prevents queued and future saves from writing but never interrupts a write
//! already running inside the store. The completion chain is kept apart from
//! the in-flight entry, so a save scheduled after the cancellation is cleared
//! still waits for that running write.

mod ticket;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use scrivo_primitives::ResourceId;
use scrivo_store::DocumentStore;
use scrivo_worker::{GenerationClock, TaskClass};
pub use ticket::SaveTicket;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::error::SaveError;
use crate::recovery::{BackupChain, BackupTier};

/// Result of a save that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
	/// Content reached the persistent store.
	Written { saved_at: DateTime<Utc> },
	/// The resource was cancelled before the write started.
	Skipped,
	/// The store reported the resource missing; it is now cancelled.
	ResourceGone,
}

/// Completion signal of the newest task scheduled for a resource.
struct ChainTail {
	generation: u64,
	done: watch::Receiver<bool>,
}

#[derive(Default)]
struct SaveQueue {
	/// Generation of the save each resource is waiting on. Dropped on cancel.
	inflight: HashMap<ResourceId, u64>,
	/// Outlives cancellation; only the owning task removes it.
	tails: HashMap<ResourceId, ChainTail>,
	cancelled: HashSet<ResourceId>,
}

struct CoordinatorInner {
	store: Arc<dyn DocumentStore>,
	recovery: BackupChain,
	queue: Mutex<SaveQueue>,
	generations: GenerationClock,
}

/// Serializes saves per resource and runs the backup chain on failure.
///
/// Cheap to clone; clones share one queue.
#[derive(Clone)]
pub struct SaveCoordinator {
	inner: Arc<CoordinatorInner>,
}

impl fmt::Debug for SaveCoordinator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let queue = self.inner.queue.lock();
		f.debug_struct("SaveCoordinator")
			.field("inflight", &queue.inflight.len())
			.field("cancelled", &queue.cancelled.len())
			.finish_non_exhaustive()
	}
}

impl SaveCoordinator {
	pub fn new(store: Arc<dyn DocumentStore>, recovery: BackupChain) -> Self {
		Self {
			inner: Arc::new(CoordinatorInner {
				store,
				recovery,
				queue: Mutex::new(SaveQueue::default()),
				generations: GenerationClock::new(),
			}),
		}
	}

	/// Queues a save of `resource`.
	///
	/// `content` is called when the write is about to start, after every
	/// earlier save of the same resource has finished, so content that
	/// accumulates while waiting is written in its latest form.
	///
	/// The save runs whether or not the returned ticket is awaited.
	pub fn schedule_save<F>(&self, resource: ResourceId, content: F) -> SaveTicket
	where
		F: FnOnce() -> String + Send + 'static,
	{
		let (generation, previous, done) = {
			let mut queue = self.inner.queue.lock();
			if queue.cancelled.contains(&resource) {
				debug!(resource = %resource, "save.skipped.cancelled");
				return SaveTicket::ready(resource, Ok(SaveOutcome::Skipped));
			}

			let generation = self.inner.generations.next();
			let (done_tx, done_rx) = watch::channel(false);
			queue.inflight.insert(resource.clone(), generation);
			let previous = queue
				.tails
				.insert(resource.clone(), ChainTail { generation, done: done_rx })
				.map(|tail| tail.done);
			(generation, previous, done_tx)
		};

		trace!(resource = %resource, generation, chained = previous.is_some(), "save.scheduled");

		let guard = CompletionGuard {
			inner: Arc::clone(&self.inner),
			resource: resource.clone(),
			generation,
			done,
		};
		let inner = Arc::clone(&self.inner);
		let task_resource = resource.clone();
		let handle = scrivo_worker::spawn(TaskClass::Io, async move {
			let _guard = guard;
			if let Some(mut previous) = previous {
				// A dropped sender means the predecessor is gone; either way it is over.
				let _ = previous.wait_for(|done| *done).await;
			}
			inner.run(&task_resource, content).await
		});

		SaveTicket::spawned(resource, handle)
	}

	/// Marks `resource` deleted: queued and future saves resolve as
	/// [`SaveOutcome::Skipped`] until [`Self::clear_cancelled`] is called.
	pub fn cancel_pending_saves(&self, resource: &ResourceId) {
		let mut queue = self.inner.queue.lock();
		queue.cancelled.insert(resource.clone());
		queue.inflight.remove(resource);
		debug!(resource = %resource, "save.cancelled");
	}

	/// Allows saves for a previously cancelled resource again.
	pub fn clear_cancelled(&self, resource: &ResourceId) {
		if self.inner.queue.lock().cancelled.remove(resource) {
			debug!(resource = %resource, "save.cancel_cleared");
		}
	}

	pub fn is_cancelled(&self, resource: &ResourceId) -> bool {
		self.inner.is_cancelled(resource)
	}

	/// True while a save for `resource` is queued or running.
	pub fn is_saving(&self, resource: &ResourceId) -> bool {
		self.inner.queue.lock().inflight.contains_key(resource)
	}

	/// Number of resources with a save queued or running.
	pub fn inflight_count(&self) -> usize {
		self.inner.queue.lock().inflight.len()
	}

	/// Runs the backup chain for `content` outside of a save.
	pub async fn backup(&self, resource: &ResourceId, content: &str) -> Option<BackupTier> {
		self.inner.recovery.secure(resource, content).await
	}
}

impl CoordinatorInner {
	fn is_cancelled(&self, resource: &ResourceId) -> bool {
		self.queue.lock().cancelled.contains(resource)
	}

	async fn run<F>(&self, resource: &ResourceId, content: F) -> Result<SaveOutcome, SaveError>
	where
		F: FnOnce() -> String,
	{
		if self.is_cancelled(resource) {
			debug!(resource = %resource, "save.skipped.cancelled_while_queued");
			return Ok(SaveOutcome::Skipped);
		}

		let content = content();
		match self.store.write(resource, &content).await {
			Ok(()) => {
				debug!(resource = %resource, bytes = content.len(), "save.write.ok");
				Ok(SaveOutcome::Written { saved_at: Utc::now() })
			}
			Err(err) if err.is_not_found() => {
				self.queue.lock().cancelled.insert(resource.clone());
				info!(resource = %resource, "save.resource_gone");
				Ok(SaveOutcome::ResourceGone)
			}
			Err(err) => {
				warn!(resource = %resource, error = %err, "save.write.failed");
				let recovered = self.recovery.secure(resource, &content).await;
				Err(SaveError::Write {
					resource: resource.clone(),
					source: err,
					recovered,
				})
			}
		}
	}

	/// Drops the entries for `resource` unless a newer save has replaced them.
	fn release(&self, resource: &ResourceId, generation: u64) {
		let mut queue = self.queue.lock();
		if queue.inflight.get(resource) == Some(&generation) {
			queue.inflight.remove(resource);
		}
		if queue.tails.get(resource).is_some_and(|tail| tail.generation == generation) {
			queue.tails.remove(resource);
		}
	}
}

struct CompletionGuard {
	inner: Arc<CoordinatorInner>,
	resource: ResourceId,
	generation: u64,
	done: watch::Sender<bool>,
}

impl Drop for CompletionGuard {
	fn drop(&mut self) {
		self.inner.release(&self.resource, self.generation);
		self.done.send_replace(true);
	}
}
