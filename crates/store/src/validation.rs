//! Checks that keep resource ids and store keys from escaping their
//! storage directory.

/// Maximum accepted length of an id or key, in bytes.
pub const MAX_KEY_LEN: usize = 255;

const RESERVED_CHARS: [char; 8] = ['*', '?', '<', '>', '|', ':', '"', '\0'];

/// Validates a resource id or store key for use as a file name stem.
pub fn validate_key(key: &str) -> Result<(), &'static str> {
	if key.is_empty() {
		return Err("must not be empty");
	}
	if key.len() > MAX_KEY_LEN {
		return Err("too long");
	}
	if key.contains('/') || key.contains('\\') {
		return Err("must not contain path separators");
	}
	if key.starts_with('.') {
		return Err("must not start with '.'");
	}
	if key.chars().any(|c| RESERVED_CHARS.contains(&c) || c.is_control()) {
		return Err("contains reserved characters");
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_plain_ids() {
		assert!(validate_key("scene-42").is_ok());
		assert!(validate_key("0b6f2c1e_draft").is_ok());
	}

	#[test]
	fn rejects_traversal_and_reserved() {
		assert!(validate_key("").is_err());
		assert!(validate_key("..").is_err());
		assert!(validate_key(".hidden").is_err());
		assert!(validate_key("a/b").is_err());
		assert!(validate_key("a\\b").is_err());
		assert!(validate_key("a:b").is_err());
		assert!(validate_key("a\nb").is_err());
		assert!(validate_key(&"x".repeat(MAX_KEY_LEN + 1)).is_err());
	}
}
