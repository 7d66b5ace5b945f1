//! Error types for the store boundaries.

use std::path::PathBuf;

use scrivo_primitives::ResourceId;
use thiserror::Error;

/// Failure reported by a [`DocumentStore`](crate::DocumentStore).
#[derive(Debug, Error)]
pub enum StoreError {
	/// The document no longer exists (deleted, or never created).
	#[error("resource {resource} does not exist")]
	NotFound { resource: ResourceId },

	/// The id cannot be mapped onto storage safely.
	#[error("invalid resource id {resource:?}: {reason}")]
	InvalidResourceId { resource: ResourceId, reason: &'static str },

	/// Content exceeds the store's size limit.
	#[error("document {resource} is {size} bytes (limit {limit})")]
	TooLarge { resource: ResourceId, size: usize, limit: usize },

	/// Underlying filesystem failure.
	#[error("I/O error at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Any other backend failure.
	#[error("{0}")]
	Backend(String),
}

impl StoreError {
	/// Returns true for the "resource does not exist" class of failure.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}

	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}
}

/// Failure reported by a backup tier.
#[derive(Debug, Error)]
pub enum BackupError {
	#[error("I/O error at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to encode backup: {0}")]
	Encode(#[from] serde_json::Error),

	#[error("invalid backup key {key:?}: {reason}")]
	InvalidKey { key: String, reason: &'static str },

	#[error("{0}")]
	Backend(String),
}

impl BackupError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io { path: path.into(), source }
	}
}
