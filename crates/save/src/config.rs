//! Save layer configuration.
//!
//! Read from a TOML file; every field is optional:
//!
//! ```toml
//! debounce-ms = 1500
//! backup-ttl-hours = 24
//! max-document-bytes = 10485760
//! data-dir = "/home/me/.local/share/scrivo"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a [`SaveConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading the configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The file is not valid TOML or has unknown keys.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A field holds an unusable value.
	#[error("invalid value for {field}: {reason}")]
	Invalid { field: &'static str, reason: &'static str },

	/// No `data-dir` was configured and the platform has no data directory.
	#[error("no data directory available; set data-dir in the config")]
	NoDataDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SaveConfig {
	/// Quiet period after the last edit before an autosave, in milliseconds.
	pub debounce_ms: u64,
	/// Lifetime of emergency backups, in hours.
	pub backup_ttl_hours: u64,
	/// Largest document the file store accepts.
	pub max_document_bytes: usize,
	/// Root for documents and backups. Defaults to the platform data dir.
	pub data_dir: Option<PathBuf>,
}

impl Default for SaveConfig {
	fn default() -> Self {
		Self {
			debounce_ms: 1500,
			backup_ttl_hours: 24,
			max_document_bytes: scrivo_store::FsDocumentStore::DEFAULT_MAX_BYTES,
			data_dir: None,
		}
	}
}

impl SaveConfig {
	pub fn parse(src: &str) -> Result<Self> {
		let config: Self = toml::from_str(src)?;
		config.validate()?;
		Ok(config)
	}

	pub fn load(path: &Path) -> Result<Self> {
		let src = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&src)
	}

	/// Like [`Self::load`], but a missing file yields the defaults.
	pub fn load_or_default(path: &Path) -> Result<Self> {
		match Self::load(path) {
			Err(ConfigError::Io { error, .. }) if error.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!(path = %path.display(), "config.missing_using_defaults");
				Ok(Self::default())
			}
			other => other,
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.debounce_ms == 0 {
			return Err(ConfigError::Invalid {
				field: "debounce-ms",
				reason: "must be greater than zero",
			});
		}
		if self.backup_ttl_hours == 0 {
			return Err(ConfigError::Invalid {
				field: "backup-ttl-hours",
				reason: "must be greater than zero",
			});
		}
		if self.max_document_bytes == 0 {
			return Err(ConfigError::Invalid {
				field: "max-document-bytes",
				reason: "must be greater than zero",
			});
		}
		Ok(())
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	pub fn backup_ttl(&self) -> Duration {
		Duration::from_secs(self.backup_ttl_hours.saturating_mul(3600))
	}

	/// Configured data dir, or `<platform data dir>/scrivo`.
	pub fn data_dir(&self) -> Result<PathBuf> {
		match &self.data_dir {
			Some(dir) => Ok(dir.clone()),
			None => dirs::data_dir().map(|d| d.join("scrivo")).ok_or(ConfigError::NoDataDir),
		}
	}

	/// Default config file location, `<platform config dir>/scrivo/save.toml`.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|d| d.join("scrivo").join("save.toml"))
	}
}
