use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::settings::DEFAULT_SYNC_INTERVAL_MINUTES;
use crate::snippet::Tag;

/// Application configuration DTO
/// 应用配置 DTO
///
/// Every section and key is optional in the file; missing values take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub oauth: OAuthConfig,
    pub capture: CaptureConfig,
    pub sync: SyncConfig,
}

/// Remote object store (Drive v3) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Name of the single backup object in the app-private namespace.
    pub file_name: String,
    pub api_base_url: String,
    pub upload_base_url: String,
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure; `0` disables retrying.
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            file_name: "snipvault-backup.json".to_string(),
            api_base_url: "https://www.googleapis.com".to_string(),
            upload_base_url: "https://www.googleapis.com".to_string(),
            timeout_secs: 30,
            retry_attempts: 1,
            retry_backoff_ms: 500,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// OAuth device-flow client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// May be empty; interactive acquisition then fails with a clear error.
    pub client_id: String,
    pub client_secret: String,
    pub device_authorization_url: String,
    pub token_url: String,
    pub revoke_url: String,
    pub scope: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            device_authorization_url: "https://oauth2.googleapis.com/device/code".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            revoke_url: "https://oauth2.googleapis.com/revoke".to_string(),
            scope: "https://www.googleapis.com/auth/drive.appdata".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub poll_interval_secs: u64,
    /// Pending prompts older than this are discarded.
    pub pending_ttl_secs: u64,
    pub tag_name: String,
    pub tag_emoji: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
            pending_ttl_secs: 24 * 60 * 60,
            tag_name: "clipboard".to_string(),
            tag_emoji: "📋".to_string(),
        }
    }
}

impl CaptureConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn pending_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_ttl_secs)
    }

    /// The sentinel tag attached to captured snippets.
    pub fn tag(&self) -> Tag {
        Tag::new(self.tag_name.clone(), self.tag_emoji.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Interval armed by `EnableSync` when sync is currently off.
    pub default_interval_minutes: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_interval_minutes: DEFAULT_SYNC_INTERVAL_MINUTES,
        }
    }
}

impl AppConfig {
    /// Create AppConfig from TOML value
    /// 从 TOML 值创建 AppConfig
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let config = toml_value.clone().try_into::<AppConfig>()?;
        Ok(config)
    }
}
