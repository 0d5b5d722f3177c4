//! # sv-core
//!
//! Core domain models and port definitions for SnipVault.
//!
//! This crate contains pure domain types without any infrastructure dependencies.

pub mod app_dirs;
pub mod capture;
pub mod config;
pub mod credential;
pub mod ids;
pub mod ports;
pub mod settings;
pub mod snippet;
pub mod sync;

// Re-export commonly used types at the crate root
pub use capture::{CaptureAction, PendingCapture, CAPTURE_BUTTONS};
pub use config::AppConfig;
pub use credential::{AuthorizationRequest, Credential};
pub use ids::{NotificationId, RemoteHandle, SnippetId};
pub use settings::{ScheduleState, SettingChange, SettingKey, SharedSettings};
pub use snippet::{Snippet, Tag};
pub use sync::{RemoteSnapshot, SyncFailure, SyncState, SyncStatus};
