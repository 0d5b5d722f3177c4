use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::settings::{SettingChange, SharedSettings};
use crate::sync::SyncStatus;

#[derive(Debug, Error)]
pub enum SettingsStoreError {
    #[error("settings io error: {0}")]
    Io(String),

    #[error("settings file corrupt: {0}")]
    Corrupt(String),
}

/// Shared, change-observable settings store.
///
/// Every successful write broadcasts the changed key, including writes that
/// leave the value unchanged. Observers decide what counts as a change.
#[async_trait]
pub trait SettingsStorePort: Send + Sync {
    async fn load(&self) -> Result<SharedSettings, SettingsStoreError>;

    async fn set_sync_interval(&self, minutes: u32) -> Result<(), SettingsStoreError>;

    async fn set_capture_enabled(&self, enabled: bool) -> Result<(), SettingsStoreError>;

    async fn set_last_sync_status(&self, status: SyncStatus) -> Result<(), SettingsStoreError>;

    fn subscribe(&self) -> broadcast::Receiver<SettingChange>;
}
