use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Why a sync attempt failed.
///
/// Serialized with the human-readable tag the options surface shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncFailure {
    /// No credential, or the remote store rejected it.
    #[serde(rename = "no auth")]
    NoAuth,

    /// Transport error or unexpected remote status.
    #[serde(rename = "network")]
    Network,

    /// The host denied a required capability.
    #[serde(rename = "host permission denied")]
    HostPermissionDenied,

    /// The remote object exists but could not be parsed.
    #[serde(rename = "malformed remote data")]
    MalformedRemoteData,

    /// Local snippet or settings storage failed.
    #[serde(rename = "storage")]
    Storage,
}

impl Display for SyncFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            SyncFailure::NoAuth => "no auth",
            SyncFailure::Network => "network",
            SyncFailure::HostPermissionDenied => "host permission denied",
            SyncFailure::MalformedRemoteData => "malformed remote data",
            SyncFailure::Storage => "storage",
        };
        f.write_str(tag)
    }
}

/// Outcome of the most recent sync attempt, persisted as `lastSyncStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncStatus {
    Succeeded { at: DateTime<Utc> },
    Failed { reason: SyncFailure, at: DateTime<Utc> },
}

impl SyncStatus {
    pub fn succeeded(at: DateTime<Utc>) -> Self {
        Self::Succeeded { at }
    }

    pub fn failed(reason: SyncFailure, at: DateTime<Utc>) -> Self {
        Self::Failed { reason, at }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn failure(&self) -> Option<SyncFailure> {
        match self {
            Self::Failed { reason, .. } => Some(*reason),
            Self::Succeeded { .. } => None,
        }
    }
}

impl Display for SyncStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Succeeded { at } => write!(f, "synced at {}", at.to_rfc3339()),
            SyncStatus::Failed { reason, at } => {
                write!(f, "failed: {} ({})", reason, at.to_rfc3339())
            }
        }
    }
}
