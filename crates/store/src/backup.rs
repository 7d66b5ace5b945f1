use std::time::Duration;

use scrivo_primitives::ResourceId;
use scrivo_primitives::time::now_millis;
use serde::{Deserialize, Serialize};

/// Snapshot of document content taken after a failed save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyBackup {
	pub id: String,
	#[serde(rename = "sceneId")]
	pub resource_id: ResourceId,
	pub content: String,
	/// Creation time, Unix milliseconds.
	pub timestamp: i64,
	/// Unix milliseconds after which the backup may be discarded.
	pub expires_at: i64,
}

impl EmergencyBackup {
	/// Creates a backup stamped now and expiring after `ttl`.
	pub fn new(resource: &ResourceId, content: impl Into<String>, ttl: Duration) -> Self {
		Self::at(resource, content, now_millis(), ttl)
	}

	pub fn at(resource: &ResourceId, content: impl Into<String>, timestamp: i64, ttl: Duration) -> Self {
		let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
		Self {
			id: format!("{resource}-{timestamp}"),
			resource_id: resource.clone(),
			content: content.into(),
			timestamp,
			expires_at: timestamp.saturating_add(ttl_ms),
		}
	}

	pub fn is_expired_at(&self, now: i64) -> bool {
		self.expires_at <= now
	}
}

/// Key under which a resource's backup lands in the fallback store.
pub fn fallback_key(resource: &ResourceId) -> String {
	format!("emergency_backup_{resource}")
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn wire_format_uses_camel_case_scene_id() {
		let backup = EmergencyBackup::at(&ResourceId::from("s1"), "body", 1_000, Duration::from_secs(1));
		let json = serde_json::to_value(&backup).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"id": "s1-1000",
				"sceneId": "s1",
				"content": "body",
				"timestamp": 1000,
				"expiresAt": 2000,
			})
		);
	}

	#[test]
	fn expiry_is_exclusive_of_deadline() {
		let backup = EmergencyBackup::at(&ResourceId::from("s1"), "", 0, Duration::from_millis(10));
		assert!(!backup.is_expired_at(9));
		assert!(backup.is_expired_at(10));
	}

	#[test]
	fn huge_ttl_saturates() {
		let backup = EmergencyBackup::at(&ResourceId::from("s1"), "", 5, Duration::MAX);
		assert_eq!(backup.expires_at, i64::MAX);
	}
}
