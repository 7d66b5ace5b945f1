//! Save coordination for edited documents.
//!
//! Two components cooperate:
//!
//! - [`EditorStateTracker`]: one per open document. Tracks dirty state,
//!   debounces edits coming from a [`ContentSurface`] into a single save,
//!   and publishes a [`SaveStatus`] state machine to subscribers.
//! - [`SaveCoordinator`]: shared by all trackers. Serializes saves per
//!   [`ResourceId`], reads content at write time, and runs the
//!   [`BackupChain`] when the primary write fails.
//!
//! ```text
//! edit ─▶ tracker.mark_dirty ─▶ debounce timer ─▶ tracker.flush
//!                                                     │
//!                      coordinator.schedule_save ◀────┘
//!                                 │
//!           wait for previous save of the same resource
//!                                 │
//!                 DocumentStore::write ──fail──▶ emergency backup ──fail──▶ local fallback
//! ```
//!
//! [`SaveStatus`]: scrivo_primitives::SaveStatus
//! [`ResourceId`]: scrivo_primitives::ResourceId

pub mod config;
pub mod coordinator;
pub mod error;
pub mod layout;
pub mod recovery;
pub mod surface;
pub mod tracker;

pub use config::{ConfigError, SaveConfig};
pub use coordinator::{SaveCoordinator, SaveOutcome, SaveTicket};
pub use error::SaveError;
pub use layout::FileStores;
pub use recovery::{BackupChain, BackupTier};
pub use surface::{BufferSurface, ChangeListener, ContentSurface, SurfaceSubscription};
pub use tracker::{EditorStateTracker, StatusSnapshot, StatusSubscription};

#[cfg(test)]
mod test_support;
