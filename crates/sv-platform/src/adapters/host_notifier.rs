use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sv_core::credential::AuthorizationRequest;
use sv_core::ids::NotificationId;
use sv_core::ports::{
    ActionNotification, AuthorizationPromptPort, NotificationError, NotificationPort,
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::ipc::HostRequest;

/// Notification and prompt adapter backed by the host channel.
///
/// 通过宿主通道发送通知与授权提示的适配器。
///
/// The host echoes ids back with button presses.
pub struct HostChannelNotifier {
    tx: mpsc::Sender<HostRequest>,
    permitted: AtomicBool,
}

impl HostChannelNotifier {
    pub fn new(tx: mpsc::Sender<HostRequest>) -> Self {
        Self {
            tx,
            permitted: AtomicBool::new(true),
        }
    }

    /// Record the host's notification permission.
    pub fn set_permitted(&self, permitted: bool) {
        self.permitted.store(permitted, Ordering::SeqCst);
    }

    async fn send(&self, request: HostRequest) -> Result<(), NotificationError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| NotificationError::ChannelClosed)
    }
}

#[async_trait]
impl NotificationPort for HostChannelNotifier {
    async fn show(
        &self,
        id: &NotificationId,
        notification: ActionNotification,
    ) -> Result<(), NotificationError> {
        if !self.permitted.load(Ordering::SeqCst) {
            return Err(NotificationError::PermissionDenied);
        }

        self.send(HostRequest::ShowNotification {
            id: id.clone(),
            title: notification.title,
            message: notification.message,
            buttons: notification.buttons,
        })
        .await?;
        debug!(%id, "notification requested");
        Ok(())
    }

    async fn dismiss(&self, id: &NotificationId) -> Result<(), NotificationError> {
        self.send(HostRequest::ClearNotification { id: id.clone() })
            .await
    }
}

#[async_trait]
impl AuthorizationPromptPort for HostChannelNotifier {
    async fn request_authorization(
        &self,
        request: AuthorizationRequest,
    ) -> Result<(), NotificationError> {
        self.send(HostRequest::AuthorizationRequired {
            verification_uri: request.verification_uri,
            user_code: request.user_code,
            expires_in_secs: request.expires_in_secs,
        })
        .await
    }
}
