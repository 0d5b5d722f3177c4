//! Remote snapshot replication.

mod restore_from_remote;
mod scheduler;
mod sync_snippets;

pub use restore_from_remote::{RestoreFromRemote, RestoreOutcome};
pub use scheduler::SyncScheduler;
pub use sync_snippets::SyncSnippets;

use sv_core::ports::{CredentialError, RemoteStoreError};
use sv_core::sync::SyncFailure;

use super::credentials::CredentialManager;

/// Map a remote store error, dropping the credential when it was rejected.
fn map_remote_error(err: &RemoteStoreError, credentials: &CredentialManager) -> SyncFailure {
    match err {
        RemoteStoreError::Unauthorized(_) => {
            credentials.invalidate();
            SyncFailure::NoAuth
        }
        RemoteStoreError::Network(_)
        | RemoteStoreError::UnexpectedStatus { .. }
        | RemoteStoreError::Malformed(_) => SyncFailure::Network,
    }
}

fn map_credential_error(err: &CredentialError) -> SyncFailure {
    match err {
        CredentialError::Network(_) => SyncFailure::Network,
        CredentialError::Prompt(_) => SyncFailure::HostPermissionDenied,
        CredentialError::Store(_) => SyncFailure::Storage,
        CredentialError::NotConfigured
        | CredentialError::Denied
        | CredentialError::Expired
        | CredentialError::Rejected(_) => SyncFailure::NoAuth,
    }
}
