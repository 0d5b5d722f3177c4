//! Use cases driven by the engine.
//! 引擎驱动的用例。

pub mod capture;
pub mod credentials;
pub mod sync;

pub use capture::{CaptureSelection, CaptureWatcher, Resolution, TickOutcome};
pub use credentials::CredentialManager;
pub use sync::{RestoreFromRemote, RestoreOutcome, SyncScheduler, SyncSnippets};
