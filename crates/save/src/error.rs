//! Errors surfaced by the save pipeline.

use scrivo_primitives::ResourceId;
use scrivo_store::StoreError;
use thiserror::Error;

use crate::recovery::BackupTier;

/// A save that did not reach the persistent store.
///
/// A deleted document is not an error; see
/// [`SaveOutcome::ResourceGone`](crate::SaveOutcome::ResourceGone).
#[derive(Debug, Error)]
pub enum SaveError {
	/// The primary write failed. `recovered` names the backup tier that kept
	/// the content, if any.
	#[error("failed to save {resource}: {source} ({})", recovery_note(.recovered))]
	Write {
		resource: ResourceId,
		#[source]
		source: StoreError,
		recovered: Option<BackupTier>,
	},

	/// The save task panicked or was cancelled before reporting.
	#[error("save task for {resource} aborted: {reason}")]
	Aborted { resource: ResourceId, reason: String },
}

fn recovery_note(recovered: &Option<BackupTier>) -> String {
	match recovered {
		Some(tier) => format!("content kept in {tier}"),
		None => "no backup could be written".to_string(),
	}
}

impl SaveError {
	pub fn resource(&self) -> &ResourceId {
		match self {
			Self::Write { resource, .. } | Self::Aborted { resource, .. } => resource,
		}
	}

	/// Backup tier that holds the content this save failed to write.
	pub fn recovered_by(&self) -> Option<BackupTier> {
		match self {
			Self::Write { recovered, .. } => *recovered,
			Self::Aborted { .. } => None,
		}
	}

	pub(crate) fn with_recovery(self, tier: Option<BackupTier>) -> Self {
		match self {
			Self::Write { resource, source, .. } => Self::Write {
				resource,
				source,
				recovered: tier,
			},
			aborted @ Self::Aborted { .. } => aborted,
		}
	}
}
