//! Storage boundaries for the save coordination layer.
//!
//! Three independent stores take part in persisting a document:
//!
//! - [`DocumentStore`]: the primary persistent store. It must report a
//!   missing document as [`StoreError::NotFound`] so callers can tell a
//!   deleted document apart from a failed write.
//! - [`EmergencyBackupStore`]: written only when the primary write fails.
//! - [`FallbackStore`]: a last-resort key/value store, written only when the
//!   emergency backup also fails.
//!
//! The [`fs`] module provides file-backed implementations of all three.

pub mod backup;
pub mod error;
pub mod fs;
pub mod validation;

use async_trait::async_trait;
pub use backup::{EmergencyBackup, fallback_key};
pub use error::{BackupError, StoreError};
pub use fs::{FsDocumentStore, FsEmergencyBackupStore, FsFallbackStore};
use scrivo_primitives::ResourceId;

/// Primary persistent store for document content.
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Replaces the stored content of `resource`.
	async fn write(&self, resource: &ResourceId, content: &str) -> Result<(), StoreError>;
}

/// Secondary store used only after a failed primary write.
#[async_trait]
pub trait EmergencyBackupStore: Send + Sync {
	async fn write(&self, backup: &EmergencyBackup) -> Result<(), BackupError>;
}

/// Last-resort key/value store.
#[async_trait]
pub trait FallbackStore: Send + Sync {
	async fn put(&self, key: &str, value: &str) -> Result<(), BackupError>;
}
