//! Port interfaces for the application layer
//!
//! Ports define the contract between the engine's use cases and the
//! infrastructure/platform adapters that talk to disks, HTTP endpoints, the
//! OS keyring, the system clipboard and the host process.
//!
//! ## Port Placement Guidelines
//!
//! A port belongs here when it represents a capability the use cases depend
//! on and an adapter in `sv-infra` or `sv-platform` implements it.

pub mod app_dirs;
pub mod clipboard;
mod clock;
pub mod credential;
pub mod errors;
pub mod notification;
pub mod remote_store;
pub mod settings;
pub mod snippet_repository;

pub use app_dirs::AppDirsPort;
pub use clipboard::{ClipboardReadError, SystemClipboardPort};
pub use clock::*;
pub use credential::{
    AuthorizationPromptPort, CredentialError, CredentialProviderPort, GrantStoreError,
    GrantStorePort,
};
pub use errors::AppDirsError;
pub use notification::{ActionNotification, NotificationError, NotificationPort};
pub use remote_store::{RemoteStoreError, RemoteStorePort};
pub use settings::{SettingsStoreError, SettingsStorePort};
pub use snippet_repository::{SnippetRepositoryError, SnippetRepositoryPort, SnippetsChanged};
