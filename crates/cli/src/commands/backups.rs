use anyhow::Context;
use scrivo_primitives::ResourceId;
use scrivo_primitives::time::to_rfc3339;
use scrivo_save::{FileStores, SaveConfig};

use crate::cli::BackupsAction;

pub async fn run(config: &SaveConfig, action: BackupsAction) -> anyhow::Result<()> {
	let stores = FileStores::from_config(config)?;
	match action {
		BackupsAction::Show { resource, json } => {
			let resource = ResourceId::from(resource);
			let Some(backup) = stores
				.backups
				.latest_for(&resource)
				.await
				.with_context(|| format!("reading backups in {}", stores.backups.dir().display()))?
			else {
				println!("no backup for {resource}");
				return Ok(());
			};
			if json {
				println!("{}", serde_json::to_string_pretty(&backup)?);
			} else {
				println!("# {} (taken {}, expires {})", backup.id, to_rfc3339(backup.timestamp), to_rfc3339(backup.expires_at));
				println!("{}", backup.content);
			}
		}
		BackupsAction::Cleanup => {
			let cleaned = stores.backups.cleanup_expired().await?;
			println!("removed {cleaned} expired backup(s)");
		}
	}
	Ok(())
}
