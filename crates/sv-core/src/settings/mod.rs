//! Shared settings: the schedule state plus the last sync outcome.

pub mod model;

pub use model::{ScheduleState, SettingChange, SettingKey, SharedSettings, DEFAULT_SYNC_INTERVAL_MINUTES};
