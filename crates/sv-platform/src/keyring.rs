use keyring::Entry;
use sv_core::ports::{GrantStoreError, GrantStorePort};

const SERVICE_NAME: &str = "SnipVault";
const GRANT_PREFIX: &str = "oauth-refresh:v1:";

fn build_username(account: &str) -> String {
    format!("{}{}", GRANT_PREFIX, account)
}

trait KeyringEntryOps {
    fn get_password(&self) -> Result<String, keyring::Error>;
    fn set_password(&self, secret: &str) -> Result<(), keyring::Error>;
    fn delete_credential(&self) -> Result<(), keyring::Error>;
}

trait KeyringBackend {
    type Entry: KeyringEntryOps;
    fn new_entry(&self, service: &str, username: &str) -> Result<Self::Entry, keyring::Error>;
}

struct RealBackend;

struct RealEntry {
    inner: Entry,
}

impl KeyringEntryOps for RealEntry {
    fn get_password(&self) -> Result<String, keyring::Error> {
        self.inner.get_password()
    }

    fn set_password(&self, secret: &str) -> Result<(), keyring::Error> {
        self.inner.set_password(secret)
    }

    fn delete_credential(&self) -> Result<(), keyring::Error> {
        self.inner.delete_credential()
    }
}

impl KeyringBackend for RealBackend {
    type Entry = RealEntry;

    fn new_entry(&self, service: &str, username: &str) -> Result<Self::Entry, keyring::Error> {
        Entry::new(service, username).map(|inner| RealEntry { inner })
    }
}

fn open_entry<B: KeyringBackend>(backend: &B, account: &str) -> Result<B::Entry, GrantStoreError> {
    backend
        .new_entry(SERVICE_NAME, &build_username(account))
        .map_err(|e| GrantStoreError::Store(format!("failed to access keyring entry: {}", e)))
}

fn load_grant_with_backend<B: KeyringBackend>(
    backend: &B,
    account: &str,
) -> Result<Option<String>, GrantStoreError> {
    let entry = open_entry(backend, account)?;
    match entry.get_password() {
        Ok(grant) => Ok(Some(grant)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(keyring::Error::PlatformFailure(msg)) => Err(GrantStoreError::Store(msg.to_string())),
        Err(e) => Err(GrantStoreError::Store(format!("failed to read grant: {}", e))),
    }
}

fn store_grant_with_backend<B: KeyringBackend>(
    backend: &B,
    account: &str,
    grant: &str,
) -> Result<(), GrantStoreError> {
    let entry = open_entry(backend, account)?;
    entry
        .set_password(grant)
        .map_err(|e| GrantStoreError::Store(format!("failed to store grant: {}", e)))
}

fn clear_grant_with_backend<B: KeyringBackend>(
    backend: &B,
    account: &str,
) -> Result<(), GrantStoreError> {
    let entry = open_entry(backend, account)?;
    match entry.delete_credential() {
        Ok(_) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(GrantStoreError::Store(format!("failed to delete grant: {e}"))),
    }
}

/// Refresh-grant cache in the OS keyring.
///
/// `account` separates profiles sharing one OS user.
pub struct KeyringGrantStore {
    account: String,
}

impl KeyringGrantStore {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }
}

impl GrantStorePort for KeyringGrantStore {
    fn load_grant(&self) -> Result<Option<String>, GrantStoreError> {
        load_grant_with_backend(&RealBackend, &self.account)
    }

    /// Idempotent; overwrites an existing grant.
    fn store_grant(&self, grant: &str) -> Result<(), GrantStoreError> {
        store_grant_with_backend(&RealBackend, &self.account, grant)
    }

    fn clear_grant(&self) -> Result<(), GrantStoreError> {
        clear_grant_with_backend(&RealBackend, &self.account)
    }
}
