use std::path::PathBuf;

use async_trait::async_trait;
use sv_core::ports::{SettingsStoreError, SettingsStorePort};
use sv_core::settings::{SettingChange, SettingKey, SharedSettings};
use sv_core::sync::SyncStatus;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::fs::{atomic_write, read_optional};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Shared settings persisted as a JSON document.
///
/// A missing file loads as `SharedSettings::default()` (sync off, capture off).
pub struct FileSettingsStore {
    path: PathBuf,
    lock: Mutex<()>,
    changes: broadcast::Sender<SettingChange>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            changes,
        }
    }

    async fn read(&self) -> Result<SharedSettings, SettingsStoreError> {
        let content = read_optional(&self.path)
            .await
            .map_err(|e| SettingsStoreError::Io(format!("{:#}", e)))?;

        match content {
            None => Ok(SharedSettings::default()),
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| SettingsStoreError::Corrupt(e.to_string())),
        }
    }

    async fn update<F>(&self, key: SettingKey, change: F) -> Result<(), SettingsStoreError>
    where
        F: FnOnce(&mut SharedSettings) + Send,
    {
        let _guard = self.lock.lock().await;

        let mut settings = self.read().await?;
        change(&mut settings);

        let content = serde_json::to_string_pretty(&settings)
            .map_err(|e| SettingsStoreError::Corrupt(e.to_string()))?;
        atomic_write(&self.path, &content)
            .await
            .map_err(|e| SettingsStoreError::Io(format!("{:#}", e)))?;

        debug!(?key, "setting written");
        let _ = self.changes.send(SettingChange { key });
        Ok(())
    }
}

#[async_trait]
impl SettingsStorePort for FileSettingsStore {
    async fn load(&self) -> Result<SharedSettings, SettingsStoreError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    async fn set_sync_interval(&self, minutes: u32) -> Result<(), SettingsStoreError> {
        self.update(SettingKey::SyncIntervalMinutes, move |s| {
            s.sync_interval_minutes = minutes
        })
        .await
    }

    async fn set_capture_enabled(&self, enabled: bool) -> Result<(), SettingsStoreError> {
        self.update(SettingKey::CaptureEnabled, move |s| s.capture_enabled = enabled)
            .await
    }

    async fn set_last_sync_status(&self, status: SyncStatus) -> Result<(), SettingsStoreError> {
        self.update(SettingKey::LastSyncStatus, move |s| {
            s.last_sync_status = Some(status)
        })
        .await
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingChange> {
        self.changes.subscribe()
    }
}
