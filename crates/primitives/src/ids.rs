use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key under which saves for one document are serialized.
///
/// Usually a scene or document id. No validation happens here; stores that
/// map ids onto paths validate them on their side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ResourceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ResourceId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for ResourceId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl Borrow<str> for ResourceId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for ResourceId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
