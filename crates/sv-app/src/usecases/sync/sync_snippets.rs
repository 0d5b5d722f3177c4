use std::sync::Arc;

use sv_core::ports::{ClockPort, RemoteStorePort, SettingsStorePort, SnippetRepositoryPort};
use sv_core::sync::{RemoteSnapshot, SyncFailure, SyncStatus};
use tracing::{info, info_span, warn, Instrument};

use super::{map_credential_error, map_remote_error};
use crate::usecases::credentials::CredentialManager;

/// One sync attempt: upload the whole local collection as the remote snapshot.
///
/// ## Behavior / 行为
/// - Acquires a credential silently; without one the remote store is never touched.
/// - Looks the remote object up by name every time, then updates or creates it.
/// - Records the outcome as `lastSyncStatus`, success or failure.
///
/// Never prompts and never returns an error: every failure ends up in the
/// returned status.
pub struct SyncSnippets {
    credentials: Arc<CredentialManager>,
    remote: Arc<dyn RemoteStorePort>,
    snippets: Arc<dyn SnippetRepositoryPort>,
    settings: Arc<dyn SettingsStorePort>,
    clock: Arc<dyn ClockPort>,
    remote_name: String,
}

impl SyncSnippets {
    pub fn new(
        credentials: Arc<CredentialManager>,
        remote: Arc<dyn RemoteStorePort>,
        snippets: Arc<dyn SnippetRepositoryPort>,
        settings: Arc<dyn SettingsStorePort>,
        clock: Arc<dyn ClockPort>,
        remote_name: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            remote,
            snippets,
            settings,
            clock,
            remote_name: remote_name.into(),
        }
    }

    pub async fn execute(&self) -> SyncStatus {
        let span = info_span!("usecase.sync_snippets.execute", remote = %self.remote_name);

        async {
            let status = match self.attempt().await {
                Ok(count) => {
                    info!(count, "snapshot uploaded");
                    SyncStatus::succeeded(self.clock.now())
                }
                Err(reason) => {
                    warn!(%reason, "sync attempt failed");
                    SyncStatus::failed(reason, self.clock.now())
                }
            };

            if let Err(err) = self.settings.set_last_sync_status(status.clone()).await {
                warn!(error = %err, "failed to record sync status");
            }
            status
        }
        .instrument(span)
        .await
    }

    async fn attempt(&self) -> Result<usize, SyncFailure> {
        let credential = self
            .credentials
            .try_acquire(false)
            .await
            .map_err(|e| map_credential_error(&e))?
            .ok_or(SyncFailure::NoAuth)?;

        let snippets = self.snippets.list().await.map_err(|e| {
            warn!(error = %e, "failed to read snippets");
            SyncFailure::Storage
        })?;
        let count = snippets.len();

        let payload = RemoteSnapshot::new(snippets, self.clock.now())
            .to_json_bytes()
            .map_err(|e| {
                warn!(error = %e, "failed to encode snapshot");
                SyncFailure::Storage
            })?;

        let handle = self
            .remote
            .find_object(&credential, &self.remote_name)
            .await
            .map_err(|e| {
                warn!(error = %e, "remote lookup failed");
                map_remote_error(&e, &self.credentials)
            })?;

        self.remote
            .upload(&credential, handle.as_ref(), &self.remote_name, payload)
            .await
            .map_err(|e| {
                warn!(error = %e, "remote upload failed");
                map_remote_error(&e, &self.credentials)
            })?;

        Ok(count)
    }
}
