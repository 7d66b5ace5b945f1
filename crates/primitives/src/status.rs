use std::fmt;

use serde::{Deserialize, Serialize};

/// Save status of one open document, as shown by the UI indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
	/// Persisted content matches the editor.
	#[default]
	Saved,
	/// A write is in flight.
	Saving,
	/// Edits exist that have not been written yet.
	Unsaved,
	/// The last write failed.
	Error,
}

impl SaveStatus {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Saved => "saved",
			Self::Saving => "saving",
			Self::Unsaved => "unsaved",
			Self::Error => "error",
		}
	}
}

impl fmt::Display for SaveStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn default_is_saved() {
		assert_eq!(SaveStatus::default(), SaveStatus::Saved);
	}

	#[test]
	fn wire_names_are_lowercase() {
		for status in [SaveStatus::Saved, SaveStatus::Saving, SaveStatus::Unsaved, SaveStatus::Error] {
			let json = serde_json::to_string(&status).unwrap();
			assert_eq!(json, format!("\"{}\"", status.as_str()));
		}
	}
}
