use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "scrivo-autosave")]
#[command(about = "Debounced document saving with emergency backups")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Config file (defaults to the platform config dir)
	#[arg(long, short = 'c', value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Override the data directory holding documents and backups
	#[arg(long, value_name = "PATH", global = true)]
	pub data_dir: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short = 'v', global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Edit a document from stdin; each line replaces its content
	Session {
		/// Document id
		resource: String,
	},
	/// Save a file's contents into a document immediately
	Save {
		/// Document id
		resource: String,
		/// File to read the content from
		file: PathBuf,
	},
	/// Inspect or prune emergency backups
	Backups {
		#[command(subcommand)]
		action: BackupsAction,
	},
}

#[derive(Subcommand, Debug)]
pub enum BackupsAction {
	/// Print the newest unexpired backup of a document
	Show {
		/// Document id
		resource: String,
		/// Print the full record as JSON
		#[arg(long)]
		json: bool,
	},
	/// Delete expired backups
	Cleanup,
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn cli_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn global_flags_follow_subcommands() {
		let cli = Cli::try_parse_from(["scrivo-autosave", "session", "scene-1", "-v", "--data-dir", "/tmp/x"]).unwrap();
		assert!(cli.verbose);
		assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
		assert!(matches!(cli.command, Command::Session { resource } if resource == "scene-1"));
	}

	#[test]
	fn backups_show_parses_json_flag() {
		let cli = Cli::try_parse_from(["scrivo-autosave", "backups", "show", "s1", "--json"]).unwrap();
		assert!(matches!(cli.command, Command::Backups { action: BackupsAction::Show { json: true, .. } }));
	}
}
