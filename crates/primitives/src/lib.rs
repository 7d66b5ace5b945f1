//! Core types shared by the save coordination crates.

/// Boxed future aliases.
pub mod future;
/// Resource identifiers.
pub mod ids;
/// Document save status.
pub mod status;
/// Millisecond timestamp helpers.
pub mod time;

pub use future::BoxFutureSend;
pub use ids::ResourceId;
pub use status::SaveStatus;
