use std::future::IntoFuture;

use scrivo_primitives::{BoxFutureSend, ResourceId};
use scrivo_worker::join_error_panic_message;
use tokio::task::JoinHandle;

use super::SaveOutcome;
use crate::error::SaveError;

type SaveResult = Result<SaveOutcome, SaveError>;

enum TicketState {
	Ready(SaveResult),
	Spawned(JoinHandle<SaveResult>),
}

/// Handle to a scheduled save.
///
/// Await it (directly or via [`SaveTicket::wait`]) to observe the outcome.
/// Dropping the ticket does not cancel the save.
#[must_use = "dropping a ticket detaches the save; await it to observe failures"]
pub struct SaveTicket {
	resource: ResourceId,
	state: TicketState,
}

impl SaveTicket {
	pub(super) fn ready(resource: ResourceId, result: SaveResult) -> Self {
		Self {
			resource,
			state: TicketState::Ready(result),
		}
	}

	pub(super) fn spawned(resource: ResourceId, handle: JoinHandle<SaveResult>) -> Self {
		Self {
			resource,
			state: TicketState::Spawned(handle),
		}
	}

	pub fn resource(&self) -> &ResourceId {
		&self.resource
	}

	/// True once the outcome is available without waiting.
	pub fn is_finished(&self) -> bool {
		match &self.state {
			TicketState::Ready(_) => true,
			TicketState::Spawned(handle) => handle.is_finished(),
		}
	}

	pub async fn wait(self) -> SaveResult {
		match self.state {
			TicketState::Ready(result) => result,
			TicketState::Spawned(handle) => match handle.await {
				Ok(result) => result,
				Err(err) => Err(SaveError::Aborted {
					resource: self.resource,
					reason: join_error_panic_message(err).unwrap_or_else(|| "cancelled".to_string()),
				}),
			},
		}
	}
}

impl IntoFuture for SaveTicket {
	type Output = SaveResult;
	type IntoFuture = BoxFutureSend<'static, SaveResult>;

	fn into_future(self) -> Self::IntoFuture {
		Box::pin(self.wait())
	}
}
