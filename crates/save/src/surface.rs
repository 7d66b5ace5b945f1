//! Observer interface between an editable content surface and its tracker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

/// Callback fired after the surface's content changed.
pub type ChangeListener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`ContentSurface::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceSubscription(u64);

impl SurfaceSubscription {
	pub const fn new(id: u64) -> Self {
		Self(id)
	}

	pub const fn id(self) -> u64 {
		self.0
	}
}

/// An editor component whose content can be saved.
///
/// Implementations must not hold internal locks while invoking listeners;
/// listeners call back into [`ContentSurface::content`] indirectly.
pub trait ContentSurface: Send + Sync {
	/// Current serializable content.
	fn content(&self) -> String;

	fn subscribe(&self, listener: ChangeListener) -> SurfaceSubscription;

	fn unsubscribe(&self, subscription: SurfaceSubscription);

	fn is_destroyed(&self) -> bool;
}

/// In-memory [`ContentSurface`] holding a string.
#[derive(Default)]
pub struct BufferSurface {
	content: RwLock<String>,
	listeners: Mutex<Vec<(SurfaceSubscription, ChangeListener)>>,
	next_id: AtomicU64,
	destroyed: AtomicBool,
}

impl BufferSurface {
	pub fn new(initial: impl Into<String>) -> Self {
		Self {
			content: RwLock::new(initial.into()),
			..Self::default()
		}
	}

	/// Replaces the content and notifies subscribers. Ignored once destroyed.
	pub fn set_content(&self, content: impl Into<String>) {
		self.edit(|buf| *buf = content.into());
	}

	/// Mutates the content in place and notifies subscribers.
	pub fn edit(&self, f: impl FnOnce(&mut String)) {
		if self.is_destroyed() {
			return;
		}
		f(&mut self.content.write());
		self.notify();
	}

	pub fn destroy(&self) {
		self.destroyed.store(true, Ordering::Release);
		self.listeners.lock().clear();
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.lock().len()
	}

	fn notify(&self) {
		let listeners: Vec<_> = self.listeners.lock().iter().map(|(_, l)| Arc::clone(l)).collect();
		for listener in listeners {
			listener();
		}
	}
}

impl ContentSurface for BufferSurface {
	fn content(&self) -> String {
		self.content.read().clone()
	}

	fn subscribe(&self, listener: ChangeListener) -> SurfaceSubscription {
		let subscription = SurfaceSubscription(self.next_id.fetch_add(1, Ordering::Relaxed));
		self.listeners.lock().push((subscription, listener));
		subscription
	}

	fn unsubscribe(&self, subscription: SurfaceSubscription) {
		self.listeners.lock().retain(|(id, _)| *id != subscription);
	}

	fn is_destroyed(&self) -> bool {
		self.destroyed.load(Ordering::Acquire)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use super::*;

	#[test]
	fn edits_notify_until_unsubscribed() {
		let surface = BufferSurface::new("a");
		let hits = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&hits);
		let sub = surface.subscribe(Arc::new(move || {
			counter.fetch_add(1, Ordering::SeqCst);
		}));

		surface.set_content("b");
		surface.edit(|s| s.push('c'));
		assert_eq!(surface.content(), "bc");
		assert_eq!(hits.load(Ordering::SeqCst), 2);

		surface.unsubscribe(sub);
		surface.set_content("d");
		assert_eq!(hits.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn destroyed_surface_ignores_edits() {
		let surface = BufferSurface::new("keep");
		surface.subscribe(Arc::new(|| {}));
		surface.destroy();

		surface.set_content("lost");
		assert!(surface.is_destroyed());
		assert_eq!(surface.content(), "keep");
		assert_eq!(surface.listener_count(), 0);
	}
}
