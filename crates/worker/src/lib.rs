//! Worker primitives for the scrivo save pipeline.
//!
//! Every background task the save layer starts (debounce timers, queued
//! saves) goes through [`spawn`] so it is attached to the active tokio
//! runtime and tagged with a [`TaskClass`] for tracing.

mod class;
mod spawn;
mod token;

pub use class::TaskClass;
pub use spawn::{join_error_panic_message, spawn};
pub use token::{GenerationClock, GenerationToken};

#[cfg(test)]
mod panic_tests;
