use std::any::Any;
use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Handle, Runtime};
use tokio::task::{JoinError, JoinHandle};

use crate::TaskClass;

/// Runtime used when a save or debounce timer is started from plain
/// threads, such as a UI callback outside any tokio context.
fn fallback_runtime() -> &'static Runtime {
	static FALLBACK: OnceLock<Runtime> = OnceLock::new();
	FALLBACK.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(2)
			.thread_name("scrivo-save")
			.build()
			.expect("scrivo-save fallback runtime must start")
	})
}

/// Starts a save-pipeline task.
///
/// Tasks land on the caller's runtime when there is one, otherwise on a
/// shared fallback runtime. `class` only tags the task for tracing.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	match Handle::try_current() {
		Ok(handle) => handle.spawn(fut),
		Err(_) => fallback_runtime().spawn(fut),
	}
}

/// Message of a panicked save task, used to build `SaveError::Aborted`.
/// `None` when the task was aborted instead.
pub fn join_error_panic_message(err: JoinError) -> Option<String> {
	let payload: Box<dyn Any + Send> = err.try_into_panic().ok()?;
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		return Some((*msg).to_string());
	}
	if let Some(msg) = payload.downcast_ref::<String>() {
		return Some(msg.clone());
	}
	Some("non-string panic payload".to_string())
}
