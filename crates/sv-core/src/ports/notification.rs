use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::NotificationId;

/// A host notification carrying action buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionNotification {
    pub title: String,
    pub message: String,
    pub buttons: Vec<String>,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("host denied notification permission")]
    PermissionDenied,

    #[error("host channel closed")]
    ChannelClosed,
}

/// Raise and clear host notifications.
///
/// Button presses come back to the engine as commands, not through this port.
/// The caller picks the id, so it can be ready for a click before `show` returns.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn show(
        &self,
        id: &NotificationId,
        notification: ActionNotification,
    ) -> Result<(), NotificationError>;

    /// Must be idempotent: dismissing an unknown id is not an error.
    async fn dismiss(&self, id: &NotificationId) -> Result<(), NotificationError>;
}
