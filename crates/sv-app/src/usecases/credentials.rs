//! In-memory credential cache in front of the identity provider.
//! 身份提供方之前的内存凭据缓存。

use std::sync::{Arc, Mutex, PoisonError};

use sv_core::credential::Credential;
use sv_core::ports::{CredentialError, CredentialProviderPort};
use tracing::{debug, info, info_span, warn, Instrument};

/// Holds the current bearer token for the lifetime of the process.
///
/// ## Behavior / 行为
/// - `acquire(false)` never prompts; it only exchanges a cached grant.
/// - `acquire(true)` may run the interactive flow and wait for the user.
/// - `invalidate()` drops the token after the remote store rejected it.
/// - `revoke()` drops the token, clears the grant and revokes upstream.
pub struct CredentialManager {
    provider: Arc<dyn CredentialProviderPort>,
    cached: Mutex<Option<Credential>>,
}

impl CredentialManager {
    pub fn new(provider: Arc<dyn CredentialProviderPort>) -> Self {
        Self {
            provider,
            cached: Mutex::new(None),
        }
    }

    fn cached(&self) -> Option<Credential> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, credential: Option<Credential>) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = credential;
    }

    /// Like [`Self::acquire`] but keeps the provider error.
    ///
    /// `Ok(None)` means no grant is available without user interaction.
    pub async fn try_acquire(
        &self,
        interactive: bool,
    ) -> Result<Option<Credential>, CredentialError> {
        if let Some(credential) = self.cached() {
            return Ok(Some(credential));
        }

        let span = info_span!("usecase.credentials.acquire", interactive);
        async {
            let credential = if interactive {
                let token = self.provider.acquire_interactive().await?;
                Some(Credential::new(token, true))
            } else {
                self.provider
                    .acquire_silent()
                    .await?
                    .map(|token| Credential::new(token, false))
            };

            match &credential {
                Some(_) => info!("credential acquired"),
                None => debug!("no credential available silently"),
            }
            self.store(credential.clone());
            Ok(credential)
        }
        .instrument(span)
        .await
    }

    pub async fn acquire(&self, interactive: bool) -> Option<Credential> {
        match self.try_acquire(interactive).await {
            Ok(credential) => credential,
            Err(err) => {
                warn!(error = %err, interactive, "credential acquisition failed");
                None
            }
        }
    }

    pub fn invalidate(&self) {
        if self
            .cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
        {
            info!("cached credential invalidated");
        }
    }

    pub fn has_credential(&self) -> bool {
        self.cached().is_some()
    }

    /// Returns `false` when the upstream revocation failed. The local state is
    /// cleared either way.
    pub async fn revoke(&self) -> bool {
        let span = info_span!("usecase.credentials.revoke");
        async {
            let previous = self
                .cached
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            let token = previous.as_ref().map(|c| c.token.as_str());

            match self.provider.revoke(token).await {
                Ok(()) => {
                    info!("credential revoked");
                    true
                }
                Err(err) => {
                    warn!(error = %err, "credential revocation failed");
                    false
                }
            }
        }
        .instrument(span)
        .await
    }
}
