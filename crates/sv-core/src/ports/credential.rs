use async_trait::async_trait;
use thiserror::Error;

use crate::credential::AuthorizationRequest;
use crate::ports::notification::NotificationError;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("oauth client is not configured")]
    NotConfigured,

    #[error("authorization was denied by the user")]
    Denied,

    #[error("authorization flow expired")]
    Expired,

    #[error("grant rejected: {0}")]
    Rejected(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("grant store error: {0}")]
    Store(#[from] GrantStoreError),

    #[error("host prompt failed: {0}")]
    Prompt(#[from] NotificationError),
}

/// Obtains bearer tokens from the identity provider.
///
/// 从身份提供方获取访问令牌。
#[async_trait]
pub trait CredentialProviderPort: Send + Sync {
    /// Exchange the cached grant for a token without user interaction.
    ///
    /// Returns `Ok(None)` when no grant is cached or the grant was rejected.
    async fn acquire_silent(&self) -> Result<Option<String>, CredentialError>;

    /// Run the interactive flow; suspends until the user finishes or it expires.
    async fn acquire_interactive(&self) -> Result<String, CredentialError>;

    /// Revoke upstream and clear the cached grant.
    async fn revoke(&self, access_token: Option<&str>) -> Result<(), CredentialError>;
}

#[derive(Debug, Error)]
pub enum GrantStoreError {
    #[error("grant store failed: {0}")]
    Store(String),
}

/// Host credential store holding the refresh grant.
pub trait GrantStorePort: Send + Sync {
    fn load_grant(&self) -> Result<Option<String>, GrantStoreError>;

    /// Overwrites any existing grant.
    fn store_grant(&self, grant: &str) -> Result<(), GrantStoreError>;

    /// Must be idempotent.
    fn clear_grant(&self) -> Result<(), GrantStoreError>;
}

/// Hands an interactive authorization prompt to the host.
#[async_trait]
pub trait AuthorizationPromptPort: Send + Sync {
    async fn request_authorization(
        &self,
        request: AuthorizationRequest,
    ) -> Result<(), NotificationError>;
}
