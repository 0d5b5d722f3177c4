//! Remote-access credential held in process memory.

use serde::{Deserialize, Serialize};

/// A bearer token plus how it was obtained.
///
/// Never persisted; only the refresh grant is cached by the host keyring.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub interactivity_used: bool,
}

impl Credential {
    pub fn new(token: impl Into<String>, interactivity_used: bool) -> Self {
        Self {
            token: token.into(),
            interactivity_used,
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("interactivity_used", &self.interactivity_used)
            .finish()
    }
}

/// Device-authorization prompt handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub verification_uri: String,
    pub user_code: String,
    pub expires_in_secs: u64,
}
