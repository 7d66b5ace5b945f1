use std::path::Path;

use anyhow::Context;
use scrivo_primitives::ResourceId;
use scrivo_save::{FileStores, SaveConfig, SaveOutcome};

pub async fn run(config: &SaveConfig, resource: ResourceId, file: &Path) -> anyhow::Result<()> {
	let content = tokio::fs::read_to_string(file)
		.await
		.with_context(|| format!("reading {}", file.display()))?;
	let stores = FileStores::from_config(config)?;
	let coordinator = stores.coordinator(config);

	match coordinator.schedule_save(resource.clone(), move || content).await? {
		SaveOutcome::Written { saved_at } => println!("saved {resource} at {}", saved_at.to_rfc3339()),
		SaveOutcome::ResourceGone => println!("{resource} does not exist; nothing saved"),
		SaveOutcome::Skipped => println!("{resource} is cancelled; nothing saved"),
	}
	Ok(())
}
