// HostRequest 只描述「需要宿主做的事」，由 bridge 原样转发给宿主进程。

use serde::{Deserialize, Serialize};
use sv_core::ids::NotificationId;

/// Requests the engine makes of the host process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostRequest {
    ShowNotification {
        id: NotificationId,
        title: String,
        message: String,
        buttons: Vec<String>,
    },
    ClearNotification {
        id: NotificationId,
    },
    AuthorizationRequired {
        verification_uri: String,
        user_code: String,
        expires_in_secs: u64,
    },
}
