use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sv_core::ports::{RemoteStorePort, SnippetRepositoryPort};
use sv_core::sync::{RemoteSnapshot, SyncFailure};
use tracing::{info, info_span, warn, Instrument};

use super::{map_credential_error, map_remote_error};
use crate::usecases::credentials::CredentialManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RestoreOutcome {
    Restored { count: usize },
    NoRemoteObject,
}

/// Replace the local collection with the remote snapshot.
///
/// Wholesale replacement, no merge: local snippets missing from the snapshot
/// are gone afterwards.
pub struct RestoreFromRemote {
    credentials: Arc<CredentialManager>,
    remote: Arc<dyn RemoteStorePort>,
    snippets: Arc<dyn SnippetRepositoryPort>,
    remote_name: String,
}

impl RestoreFromRemote {
    pub fn new(
        credentials: Arc<CredentialManager>,
        remote: Arc<dyn RemoteStorePort>,
        snippets: Arc<dyn SnippetRepositoryPort>,
        remote_name: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            remote,
            snippets,
            remote_name: remote_name.into(),
        }
    }

    pub async fn execute(&self) -> Result<RestoreOutcome, SyncFailure> {
        let span = info_span!("usecase.restore_from_remote.execute", remote = %self.remote_name);

        async {
            let credential = self
                .credentials
                .try_acquire(false)
                .await
                .map_err(|e| map_credential_error(&e))?
                .ok_or(SyncFailure::NoAuth)?;

            let Some(handle) = self
                .remote
                .find_object(&credential, &self.remote_name)
                .await
                .map_err(|e| map_remote_error(&e, &self.credentials))?
            else {
                info!("no remote snapshot to restore");
                return Ok(RestoreOutcome::NoRemoteObject);
            };

            let bytes = self
                .remote
                .download(&credential, &handle)
                .await
                .map_err(|e| map_remote_error(&e, &self.credentials))?;

            let snapshot = RemoteSnapshot::from_json_bytes(&bytes).map_err(|e| {
                warn!(error = %e, "remote snapshot is malformed");
                SyncFailure::MalformedRemoteData
            })?;
            let count = snapshot.snippets.len();

            self.snippets
                .replace_all(snapshot.snippets)
                .await
                .map_err(|e| {
                    warn!(error = %e, "failed to replace local snippets");
                    SyncFailure::Storage
                })?;

            info!(count, last_synced = %snapshot.last_synced, "restored from remote");
            Ok(RestoreOutcome::Restored { count })
        }
        .instrument(span)
        .await
    }
}
