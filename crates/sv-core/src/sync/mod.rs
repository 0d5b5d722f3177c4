//! Sync domain models and state machine.

pub mod snapshot;
pub mod state;
pub mod status;

pub use snapshot::RemoteSnapshot;
pub use state::SyncState;
pub use status::{SyncFailure, SyncStatus};
