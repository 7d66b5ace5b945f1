//! Per-document dirty tracking, debouncing and status publication.
//!
//! # State machine
//!
//! ```text
//! Saved   --edit-->             Unsaved
//! Unsaved --debounce elapsed--> Saving
//! Unsaved --flush-->            Saving
//! Saving  --write succeeds-->   Saved    (last_saved_at updated)
//! Saving  --write fails-->      Error
//! Error   --edit-->             Unsaved
//! Saving  --edit-->             Saving
//! ```
//!
//! Content is read when the write starts, not when the save is requested.
//! Every edit bumps an edit sequence number; the save records the sequence
//! it captured together with the content, and only clears the dirty flag if
//! no edit arrived after that point. Otherwise the tracker drops back to
//! `Unsaved` and re-arms the debounce timer.

mod status;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use scrivo_primitives::{ResourceId, SaveStatus};
use scrivo_worker::{GenerationClock, GenerationToken, TaskClass, join_error_panic_message};
use status::StatusListeners;
pub use status::StatusSnapshot;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::coordinator::{SaveCoordinator, SaveOutcome};
use crate::error::SaveError;
use crate::recovery::BackupTier;
use crate::surface::{ContentSurface, SurfaceSubscription};

#[derive(Default)]
struct TrackerState {
	is_dirty: bool,
	is_saving: bool,
	status: SaveStatus,
	last_saved_at: Option<DateTime<Utc>>,
	recovered_by: Option<BackupTier>,
	edit_seq: u64,
	timer: Option<GenerationToken>,
	subscription: Option<SurfaceSubscription>,
	destroyed: bool,
}

impl TrackerState {
	fn snapshot(&self) -> StatusSnapshot {
		StatusSnapshot {
			status: self.status,
			is_dirty: self.is_dirty,
			is_saving: self.is_saving,
			last_saved_at: self.last_saved_at,
			recovered_by: self.recovered_by,
		}
	}

	fn cancel_timer(&mut self) {
		if let Some(timer) = self.timer.take() {
			timer.cancel();
		}
	}
}

struct TrackerInner {
	resource: ResourceId,
	surface: Arc<dyn ContentSurface>,
	coordinator: SaveCoordinator,
	debounce: Duration,
	timers: GenerationClock,
	state: Mutex<TrackerState>,
	listeners: StatusListeners,
	/// Bumped whenever a save from this tracker finishes.
	completions: watch::Sender<u64>,
}

/// Save state of one open document.
///
/// Clones share state. Call [`EditorStateTracker::destroy`] when the
/// document closes.
#[derive(Clone)]
pub struct EditorStateTracker {
	inner: Arc<TrackerInner>,
}

/// Registration returned by [`EditorStateTracker::on_status_change`].
#[must_use = "keep the subscription to unsubscribe later"]
pub struct StatusSubscription {
	id: u64,
	tracker: Weak<TrackerInner>,
}

impl StatusSubscription {
	/// Stops further notifications. Returns false if the listener was
	/// already gone (tracker destroyed or dropped).
	pub fn unsubscribe(self) -> bool {
		self.tracker.upgrade().is_some_and(|inner| inner.listeners.remove(self.id))
	}
}

impl EditorStateTracker {
	/// Starts tracking `surface`, saving through `coordinator` after
	/// `debounce` of edit silence.
	pub fn attach(
		resource: ResourceId,
		surface: Arc<dyn ContentSurface>,
		coordinator: SaveCoordinator,
		debounce: Duration,
	) -> Self {
		let inner = Arc::new(TrackerInner {
			resource,
			surface,
			coordinator,
			debounce,
			timers: GenerationClock::new(),
			state: Mutex::new(TrackerState::default()),
			listeners: StatusListeners::default(),
			completions: watch::channel(0).0,
		});

		let weak = Arc::downgrade(&inner);
		let subscription = inner.surface.subscribe(Arc::new(move || {
			if let Some(inner) = weak.upgrade() {
				inner.mark_dirty();
			}
		}));
		inner.state.lock().subscription = Some(subscription);
		debug!(resource = %inner.resource, "tracker.attached");

		Self { inner }
	}

	pub fn resource(&self) -> &ResourceId {
		&self.inner.resource
	}

	/// Records an edit and (re)arms the debounce timer.
	pub fn mark_dirty(&self) {
		self.inner.mark_dirty();
	}

	/// Cancels any pending debounce and saves now.
	///
	/// Resolves immediately when the document is clean or a save from this
	/// tracker is already in flight.
	/// Dropping the returned future does not abandon a save it started.
	pub async fn save_immediate(&self) -> Result<(), SaveError> {
		self.inner.save().await
	}

	/// Alias of [`Self::save_immediate`].
	pub async fn flush(&self) -> Result<(), SaveError> {
		self.inner.save().await
	}

	/// Saves until the document is clean and nothing from this tracker is
	/// in flight.
	///
	/// Unlike [`Self::flush`], a save that is already running is waited for,
	/// and edits that arrived during it are written afterwards. Returns the
	/// first save error.
	pub async fn settle(&self) -> Result<(), SaveError> {
		let mut completions = self.inner.completions.subscribe();
		loop {
			self.inner.save().await?;
			if self.is_destroyed() {
				return Ok(());
			}
			let status = self.status();
			if !status.is_saving {
				if !status.is_dirty {
					return Ok(());
				}
				continue;
			}
			if completions.changed().await.is_err() {
				return Ok(());
			}
		}
	}

	pub fn status(&self) -> StatusSnapshot {
		self.inner.state.lock().snapshot()
	}

	/// Registers `listener`, calling it right away with the current status
	/// and again on every transition.
	pub fn on_status_change<F>(&self, listener: F) -> StatusSubscription
	where
		F: Fn(&StatusSnapshot) + Send + Sync + 'static,
	{
		let listener: status::StatusListener = Arc::new(listener);
		let id = self.inner.listeners.add(Arc::clone(&listener));
		listener(&self.status());
		StatusSubscription {
			id,
			tracker: Arc::downgrade(&self.inner),
		}
	}

	pub fn listener_count(&self) -> usize {
		self.inner.listeners.len()
	}

	/// Detaches from the surface, cancels the debounce timer and drops all
	/// listeners. Later edits never trigger saves.
	pub fn destroy(&self) {
		let subscription = {
			let mut state = self.inner.state.lock();
			if state.destroyed {
				return;
			}
			state.destroyed = true;
			state.cancel_timer();
			state.subscription.take()
		};
		if let Some(subscription) = subscription {
			self.inner.surface.unsubscribe(subscription);
		}
		self.inner.listeners.clear();
		debug!(resource = %self.inner.resource, "tracker.destroyed");
	}

	pub fn is_destroyed(&self) -> bool {
		self.inner.state.lock().destroyed
	}
}

impl TrackerInner {
	fn mark_dirty(self: &Arc<Self>) {
		let changed = {
			let mut state = self.state.lock();
			if state.destroyed {
				return;
			}
			state.edit_seq = state.edit_seq.wrapping_add(1);
			state.is_dirty = true;
			self.arm_timer(&mut state);
			match state.status {
				SaveStatus::Saved | SaveStatus::Error => {
					state.status = SaveStatus::Unsaved;
					Some(state.snapshot())
				}
				SaveStatus::Unsaved | SaveStatus::Saving => None,
			}
		};
		if let Some(snapshot) = changed {
			trace!(resource = %self.resource, "tracker.unsaved");
			self.listeners.notify(&snapshot);
		}
	}

	fn arm_timer(self: &Arc<Self>, state: &mut TrackerState) {
		state.cancel_timer();
		let token = GenerationToken::new(self.timers.next());
		state.timer = Some(token.clone());

		let weak = Arc::downgrade(self);
		let debounce = self.debounce;
		// Detached; the token is the only handle the tracker keeps.
		let _ = scrivo_worker::spawn(TaskClass::Background, async move {
			tokio::select! {
				_ = token.cancelled() => return,
				_ = tokio::time::sleep(debounce) => {}
			}
			if let Some(inner) = weak.upgrade() {
				inner.debounce_elapsed(token.generation()).await;
			}
		});
	}

	async fn debounce_elapsed(self: &Arc<Self>, generation: u64) {
		{
			let mut state = self.state.lock();
			if state.timer.as_ref().map(GenerationToken::generation) != Some(generation) {
				return;
			}
			state.timer = None;
		}
		if self.surface.is_destroyed() {
			debug!(resource = %self.resource, "tracker.autosave.surface_destroyed");
			return;
		}
		if let Err(err) = self.save().await {
			warn!(resource = %self.resource, error = %err, "tracker.autosave.failed");
		}
	}

	async fn save(self: &Arc<Self>) -> Result<(), SaveError> {
		let snapshot = {
			let mut state = self.state.lock();
			state.cancel_timer();
			if state.destroyed || !state.is_dirty || state.is_saving {
				return Ok(());
			}
			state.is_saving = true;
			state.status = SaveStatus::Saving;
			state.snapshot()
		};
		self.listeners.notify(&snapshot);

		// Detached so that `is_saving` is cleared even if the caller stops polling.
		let inner = Arc::clone(self);
		let handle = scrivo_worker::spawn(TaskClass::Interactive, async move { inner.run_save().await });
		match handle.await {
			Ok(result) => result,
			Err(err) => {
				let reason = join_error_panic_message(err).unwrap_or_else(|| "cancelled".to_string());
				Err(self.abandon(reason))
			}
		}
	}

	async fn run_save(self: Arc<Self>) -> Result<(), SaveError> {
		let captured = Arc::new(AtomicU64::new(0));
		let provider = {
			let inner = Arc::clone(&self);
			let captured = Arc::clone(&captured);
			move || {
				let seq = inner.state.lock().edit_seq;
				captured.store(seq, Ordering::Release);
				inner.surface.content()
			}
		};

		match self.coordinator.schedule_save(self.resource.clone(), provider).await {
			Ok(outcome) => {
				self.finish_ok(outcome, captured.load(Ordering::Acquire));
				Ok(())
			}
			Err(err) => Err(self.finish_err(err).await),
		}
	}

	fn finish_ok(self: &Arc<Self>, outcome: SaveOutcome, captured_seq: u64) {
		let snapshot = {
			let mut state = self.state.lock();
			state.is_saving = false;
			match outcome {
				SaveOutcome::Written { saved_at } => {
					state.last_saved_at = Some(saved_at);
					state.recovered_by = None;
					if state.edit_seq == captured_seq {
						state.is_dirty = false;
						state.status = SaveStatus::Saved;
					} else {
						state.status = SaveStatus::Unsaved;
						if !state.destroyed && state.timer.is_none() {
							self.arm_timer(&mut state);
						}
					}
				}
				SaveOutcome::Skipped | SaveOutcome::ResourceGone => {
					info!(resource = %self.resource, ?outcome, "tracker.save.discarded");
					state.is_dirty = false;
					state.status = SaveStatus::Saved;
				}
			}
			state.snapshot()
		};
		trace!(resource = %self.resource, status = %snapshot.status, "tracker.save.done");
		self.listeners.notify(&snapshot);
		self.completions.send_modify(|n| *n = n.wrapping_add(1));
	}

	async fn finish_err(self: &Arc<Self>, err: SaveError) -> SaveError {
		warn!(resource = %self.resource, error = %err, "tracker.save.failed");
		let err = if err.recovered_by().is_some() {
			err
		} else {
			let content = self.surface.content();
			let tier = self.coordinator.backup(&self.resource, &content).await;
			err.with_recovery(tier)
		};

		let snapshot = {
			let mut state = self.state.lock();
			state.is_saving = false;
			state.status = SaveStatus::Error;
			state.recovered_by = err.recovered_by();
			state.snapshot()
		};
		self.listeners.notify(&snapshot);
		self.completions.send_modify(|n| *n = n.wrapping_add(1));
		err
	}

	/// Settles the state after the save task died before reporting.
	fn abandon(&self, reason: String) -> SaveError {
		warn!(resource = %self.resource, %reason, "tracker.save.aborted");
		let snapshot = {
			let mut state = self.state.lock();
			if state.is_saving {
				state.is_saving = false;
				state.status = SaveStatus::Error;
			}
			state.snapshot()
		};
		self.listeners.notify(&snapshot);
		self.completions.send_modify(|n| *n = n.wrapping_add(1));
		SaveError::Aborted {
			resource: self.resource.clone(),
			reason,
		}
	}
}
