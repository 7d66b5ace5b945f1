/// Execution classes used for worker scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work a user is actively waiting on, such as an explicit save.
	Interactive,
	/// Deferred work that can wait, such as debounce timers.
	Background,
	/// Store writes and other I/O-bound work.
	Io,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
			Self::Io => "io",
		}
	}
}
