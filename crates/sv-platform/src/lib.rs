//! # sv-platform
//!
//! Platform-specific implementations for SnipVault.
//!
//! This crate contains adapters that interact with the operating system
//! (clipboard, keyring, user directories) and with the host process that
//! renders notifications.

pub mod adapters;
pub mod app_dirs;
pub mod ipc;
pub mod keyring;

pub use adapters::{ArboardClipboard, HostChannelNotifier};
pub use app_dirs::DirsAppDirsAdapter;
pub use ipc::HostRequest;
pub use keyring::KeyringGrantStore;
