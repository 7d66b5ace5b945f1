use std::sync::Arc;

use anyhow::Context;
use scrivo_primitives::ResourceId;
use scrivo_save::{BufferSurface, EditorStateTracker, FileStores, SaveConfig, StatusSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Reads stdin line by line into an in-memory surface and lets the tracker
/// autosave it. At end of input, waits for any running autosave and writes
/// whatever is still pending.
pub async fn run(config: &SaveConfig, resource: ResourceId) -> anyhow::Result<()> {
	let stores = FileStores::from_config(config)?;
	let initial = if stores.documents.exists(&resource).await? {
		stores.documents.read(&resource).await?
	} else {
		stores
			.documents
			.create(&resource, "")
			.await
			.with_context(|| format!("creating document {resource}"))?;
		String::new()
	};

	let surface = Arc::new(BufferSurface::new(initial));
	let tracker = EditorStateTracker::attach(resource.clone(), surface.clone(), stores.coordinator(config), config.debounce());
	let _subscription = tracker.on_status_change(|snapshot| println!("{}", describe(snapshot)));

	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	while let Some(line) = lines.next_line().await.context("reading stdin")? {
		surface.set_content(line);
	}

	let result = tracker.settle().await;
	tracker.destroy();
	surface.destroy();
	result.with_context(|| format!("final save of {resource}"))
}

fn describe(snapshot: &StatusSnapshot) -> String {
	let mut line = snapshot.status.to_string();
	if let Some(at) = snapshot.last_saved_at {
		line.push_str(&format!(" (last saved {})", at.to_rfc3339()));
	}
	if let Some(tier) = snapshot.recovered_by {
		line.push_str(&format!(" - save failed, content kept in {tier}"));
	}
	line
}
