use serde::{Deserialize, Serialize};

use crate::sync::SyncStatus;

/// Interval armed by `EnableSync` when sync was previously disabled.
pub const DEFAULT_SYNC_INTERVAL_MINUTES: u32 = 5;

/// The persisted settings document.
///
/// 持久化的共享设置文档。
///
/// Keys are written exactly as `syncIntervalMinutes`, `captureEnabled`
/// and `lastSyncStatus` so the options surface can read the same file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SharedSettings {
    /// `0` disables sync.
    #[serde(default)]
    pub sync_interval_minutes: u32,

    #[serde(default)]
    pub capture_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_status: Option<SyncStatus>,
}

impl SharedSettings {
    pub fn schedule(&self) -> ScheduleState {
        ScheduleState {
            sync_interval_minutes: self.sync_interval_minutes,
            capture_enabled: self.capture_enabled,
        }
    }
}

/// The part of the settings that drives timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    pub sync_interval_minutes: u32,
    pub capture_enabled: bool,
}

impl ScheduleState {
    pub fn sync_enabled(&self) -> bool {
        self.sync_interval_minutes > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    SyncIntervalMinutes,
    CaptureEnabled,
    LastSyncStatus,
}

impl SettingKey {
    /// Whether a change to this key can alter the schedule.
    pub fn affects_schedule(self) -> bool {
        !matches!(self, SettingKey::LastSyncStatus)
    }
}

/// Broadcast on every settings write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingChange {
    pub key: SettingKey,
}
