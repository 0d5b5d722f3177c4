use async_trait::async_trait;
use thiserror::Error;

use crate::credential::Credential;
use crate::ids::RemoteHandle;

#[derive(Debug, Error)]
pub enum RemoteStoreError {
    /// 401 or 403 from the remote store.
    #[error("remote store rejected credential (status {0})")]
    Unauthorized(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteStoreError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RemoteStoreError::Unauthorized(_))
    }
}

/// Single-object remote blob store in an application-private namespace.
///
/// Last writer wins; there is no concurrency token.
#[async_trait]
pub trait RemoteStorePort: Send + Sync {
    /// Look up the object by exact name. Zero results is `Ok(None)`.
    async fn find_object(
        &self,
        credential: &Credential,
        name: &str,
    ) -> Result<Option<RemoteHandle>, RemoteStoreError>;

    /// Update `handle` when present, otherwise create a new object.
    async fn upload(
        &self,
        credential: &Credential,
        handle: Option<&RemoteHandle>,
        name: &str,
        payload: Vec<u8>,
    ) -> Result<RemoteHandle, RemoteStoreError>;

    async fn download(
        &self,
        credential: &Credential,
        handle: &RemoteHandle,
    ) -> Result<Vec<u8>, RemoteStoreError>;
}
