//! Timestamps are stored as Unix milliseconds and rendered as RFC 3339.

use chrono::{DateTime, Utc};

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
	Utc::now().timestamp_millis()
}

/// Renders a millisecond timestamp as RFC 3339, falling back to now for
/// out-of-range values.
pub fn to_rfc3339(ts: i64) -> String {
	DateTime::from_timestamp_millis(ts)
		.map(|dt| dt.to_rfc3339())
		.unwrap_or_else(|| Utc::now().to_rfc3339())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_epoch() {
		assert_eq!(to_rfc3339(0), "1970-01-01T00:00:00+00:00");
	}

	#[test]
	fn now_is_after_epoch() {
		assert!(now_millis() > 0);
	}
}
