use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Hands out increasing generation numbers.
///
/// The save coordinator stamps each queued save with one so a finishing save
/// only clears its own queue entry. Trackers stamp debounce timers the same
/// way so a stale timer recognises it was replaced. Clones share the counter.
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
	last: Arc<AtomicU64>,
}

impl GenerationClock {
	pub fn new() -> Self {
		Self::default()
	}

	/// Next generation; the first call returns 1.
	pub fn next(&self) -> u64 {
		self.last.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}
}

/// Cancellable handle for one armed debounce timer.
#[derive(Debug, Clone)]
pub struct GenerationToken {
	generation: u64,
	cancel: CancellationToken,
}

impl GenerationToken {
	pub fn new(generation: u64) -> Self {
		Self {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Disarms the timer. Clones observe the cancellation too.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Resolves once [`Self::cancel`] has been called on any clone.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}
}
