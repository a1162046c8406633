//! In-memory doubles for the engine's collaborators, and fixtures to go with them.
pub mod fixtures;
mod memory_storefront;
pub mod prepare_env;
mod recorders;

pub use memory_storefront::MemoryStorefront;
pub use recorders::{RecordingNotifier, RecordingQueue};
