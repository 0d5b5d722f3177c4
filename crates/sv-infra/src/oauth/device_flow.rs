use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sv_core::config::OAuthConfig;
use sv_core::credential::AuthorizationRequest;
use sv_core::ports::{
    AuthorizationPromptPort, CredentialError, CredentialProviderPort, GrantStorePort,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    #[serde(alias = "verification_url")]
    verification_uri: String,
    expires_in: u64,
    #[serde(default)]
    interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

enum TokenPoll {
    Granted(TokenResponse),
    Pending,
    SlowDown,
}

/// OAuth 2.0 credential provider using the device-authorization grant.
///
/// OAuth 2.0 设备授权流程的凭据提供者。
///
/// The refresh token is the only thing persisted (through [`GrantStorePort`]);
/// access tokens are returned to the caller and never written anywhere.
pub struct OAuthCredentialProvider {
    http: reqwest::Client,
    config: OAuthConfig,
    grants: Arc<dyn GrantStorePort>,
    prompt: Arc<dyn AuthorizationPromptPort>,
}

impl OAuthCredentialProvider {
    pub fn new(
        config: OAuthConfig,
        timeout: Duration,
        grants: Arc<dyn GrantStorePort>,
        prompt: Arc<dyn AuthorizationPromptPort>,
    ) -> Result<Self, CredentialError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CredentialError::Network(format!("build http client failed: {}", e)))?;

        Ok(Self {
            http,
            config,
            grants,
            prompt,
        })
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<(reqwest::StatusCode, String), CredentialError> {
        let response = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| CredentialError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CredentialError::Network(e.to_string()))?;
        Ok((status, body))
    }

    async fn request_device_code(&self) -> Result<DeviceCodeResponse, CredentialError> {
        let (status, body) = self
            .post_form(
                &self.config.device_authorization_url,
                &[
                    ("client_id", self.config.client_id.as_str()),
                    ("scope", self.config.scope.as_str()),
                ],
            )
            .await?;

        if !status.is_success() {
            return Err(CredentialError::Rejected(describe_error(status, &body)));
        }
        serde_json::from_str(&body)
            .map_err(|e| CredentialError::Network(format!("bad device code response: {}", e)))
    }

    async fn poll_token(&self, device_code: &str) -> Result<TokenPoll, CredentialError> {
        let (status, body) = self
            .post_form(
                &self.config.token_url,
                &[
                    ("client_id", self.config.client_id.as_str()),
                    ("client_secret", self.config.client_secret.as_str()),
                    ("device_code", device_code),
                    ("grant_type", DEVICE_CODE_GRANT),
                ],
            )
            .await?;

        if status.is_success() {
            let token = serde_json::from_str(&body)
                .map_err(|e| CredentialError::Network(format!("bad token response: {}", e)))?;
            return Ok(TokenPoll::Granted(token));
        }

        let error: TokenErrorResponse = serde_json::from_str(&body)
            .map_err(|_| CredentialError::Rejected(describe_error(status, &body)))?;
        match error.error.as_str() {
            "authorization_pending" => Ok(TokenPoll::Pending),
            "slow_down" => Ok(TokenPoll::SlowDown),
            "access_denied" => Err(CredentialError::Denied),
            "expired_token" => Err(CredentialError::Expired),
            _ => Err(CredentialError::Rejected(
                error.error_description.unwrap_or(error.error),
            )),
        }
    }

    fn remember_grant(&self, token: &TokenResponse) -> Result<(), CredentialError> {
        if let Some(refresh_token) = &token.refresh_token {
            self.grants.store_grant(refresh_token)?;
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialProviderPort for OAuthCredentialProvider {
    async fn acquire_silent(&self) -> Result<Option<String>, CredentialError> {
        let Some(grant) = self.grants.load_grant()? else {
            debug!("no cached grant");
            return Ok(None);
        };

        let (status, body) = self
            .post_form(
                &self.config.token_url,
                &[
                    ("client_id", self.config.client_id.as_str()),
                    ("client_secret", self.config.client_secret.as_str()),
                    ("refresh_token", grant.as_str()),
                    ("grant_type", "refresh_token"),
                ],
            )
            .await?;

        if status.is_success() {
            let token: TokenResponse = serde_json::from_str(&body)
                .map_err(|e| CredentialError::Network(format!("bad token response: {}", e)))?;
            self.remember_grant(&token)?;
            return Ok(Some(token.access_token));
        }

        if status.is_client_error() {
            // invalid_grant and friends: the user revoked access elsewhere.
            warn!(status = status.as_u16(), "cached grant rejected, clearing it");
            self.grants.clear_grant()?;
            return Ok(None);
        }

        Err(CredentialError::Network(describe_error(status, &body)))
    }

    async fn acquire_interactive(&self) -> Result<String, CredentialError> {
        if self.config.client_id.is_empty() {
            return Err(CredentialError::NotConfigured);
        }

        let device = self.request_device_code().await?;
        info!(
            verification_uri = %device.verification_uri,
            expires_in = device.expires_in,
            "device authorization started"
        );
        self.prompt
            .request_authorization(AuthorizationRequest {
                verification_uri: device.verification_uri.clone(),
                user_code: device.user_code.clone(),
                expires_in_secs: device.expires_in,
            })
            .await?;

        let deadline = Instant::now() + Duration::from_secs(device.expires_in);
        let mut interval =
            Duration::from_secs(device.interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS));

        loop {
            match self.poll_token(&device.device_code).await? {
                TokenPoll::Granted(token) => {
                    self.remember_grant(&token)?;
                    info!("device authorization completed");
                    return Ok(token.access_token);
                }
                TokenPoll::Pending => {}
                TokenPoll::SlowDown => interval += SLOW_DOWN_STEP,
            }

            if Instant::now() + interval >= deadline {
                return Err(CredentialError::Expired);
            }
            sleep(interval).await;
        }
    }

    async fn revoke(&self, access_token: Option<&str>) -> Result<(), CredentialError> {
        let grant = self.grants.load_grant()?;
        self.grants.clear_grant()?;

        // Revoking the refresh token also revokes its access tokens.
        let Some(token) = grant.as_deref().or(access_token) else {
            debug!("nothing to revoke upstream");
            return Ok(());
        };

        let (status, body) = self
            .post_form(&self.config.revoke_url, &[("token", token)])
            .await?;
        if !status.is_success() {
            return Err(CredentialError::Rejected(describe_error(status, &body)));
        }
        info!("credential revoked upstream");
        Ok(())
    }
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) => format!(
            "{} ({})",
            err.error_description.unwrap_or(err.error),
            status.as_u16()
        ),
        Err(_) => format!("status {}", status.as_u16()),
    }
}
