//! `scrivo-autosave`: drives the save layer from the command line.

mod cli;
mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use scrivo_save::SaveConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let config = load_config(&cli)?;
	match cli.command {
		Command::Session { resource } => commands::session::run(&config, resource.into()).await,
		Command::Save { resource, file } => commands::save::run(&config, resource.into(), &file).await,
		Command::Backups { action } => commands::backups::run(&config, action).await,
	}
}

fn load_config(cli: &Cli) -> anyhow::Result<SaveConfig> {
	let mut config = match &cli.config {
		Some(path) => SaveConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
		None => match SaveConfig::default_path() {
			Some(path) => SaveConfig::load_or_default(&path).with_context(|| format!("loading config {}", path.display()))?,
			None => SaveConfig::default(),
		},
	};
	if let Some(dir) = &cli.data_dir {
		config.data_dir = Some(dir.clone());
	}
	tracing::debug!(?config, "config.loaded");
	Ok(config)
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("scrivo=debug")
			} else {
				EnvFilter::new("scrivo=info")
			}
		})
	};

	if let Some(log_dir) = std::env::var("SCRIVO_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("scrivo-autosave.{}.log", std::process::id()));
		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);
			tracing_subscriber::registry().with(filter()).with(file_layer).init();
			tracing::info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
