use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use sv_core::config::RemoteConfig;
use sv_core::credential::Credential;
use sv_core::ids::RemoteHandle;
use sv_core::ports::{RemoteStoreError, RemoteStorePort};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::multipart::RelatedBody;

/// Folder alias of the per-application private namespace.
const APP_DATA_FOLDER: &str = "appDataFolder";

type DriveResult<T> = Result<T, RemoteStoreError>;

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileResource>,
}

#[derive(Debug, Deserialize)]
struct FileResource {
    id: String,
}

/// Drive v3 REST client scoped to `appDataFolder`.
pub struct DriveClient {
    http: reqwest::Client,
    api_base_url: String,
    upload_base_url: String,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl DriveClient {
    pub fn new(config: &RemoteConfig) -> DriveResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteStoreError::Network(format!("build http client failed: {}", e)))?;

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
            retry_attempts: config.retry_attempts,
            retry_backoff: config.retry_backoff(),
        })
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.api_base_url)
    }

    fn upload_url(&self, handle: Option<&RemoteHandle>) -> String {
        match handle {
            Some(handle) => format!(
                "{}/upload/drive/v3/files/{}",
                self.upload_base_url,
                handle.as_str()
            ),
            None => format!("{}/upload/drive/v3/files", self.upload_base_url),
        }
    }

    /// Retry transport-level failures; status errors other than 5xx return at once.
    async fn retry<F, Fut, T>(&self, op: &str, mut action: F) -> DriveResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DriveResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match action().await {
                Ok(val) => return Ok(val),
                Err(err) => {
                    if attempt >= self.retry_attempts || !should_retry(&err) {
                        return Err(err);
                    }
                    attempt += 1;
                    let backoff = self.retry_backoff * attempt;
                    warn!(op, attempt, error = %err, ?backoff, "drive request failed, retrying");
                    sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait]
impl RemoteStorePort for DriveClient {
    async fn find_object(
        &self,
        credential: &Credential,
        name: &str,
    ) -> DriveResult<Option<RemoteHandle>> {
        let query = format!("name='{}' and trashed=false", escape_query_value(name));
        let url = self.files_url();
        let (url, query) = (url.as_str(), query.as_str());

        let list: FileList = self
            .retry("list", || async move {
                let response = self
                    .http
                    .get(url)
                    .bearer_auth(&credential.token)
                    .query(&[
                        ("spaces", APP_DATA_FOLDER),
                        ("q", query),
                        ("fields", "files(id,name)"),
                    ])
                    .send()
                    .await
                    .map_err(map_transport_error)?;
                let response = check_status(response).await?;
                response
                    .json::<FileList>()
                    .await
                    .map_err(|e| RemoteStoreError::Malformed(e.to_string()))
            })
            .await?;

        if list.files.len() > 1 {
            warn!(name, count = list.files.len(), "multiple remote objects share a name, using the first");
        }
        let handle = list.files.into_iter().next().map(|f| RemoteHandle::new(f.id));
        debug!(name, found = handle.is_some(), "remote object lookup");
        Ok(handle)
    }

    async fn upload(
        &self,
        credential: &Credential,
        handle: Option<&RemoteHandle>,
        name: &str,
        payload: Vec<u8>,
    ) -> DriveResult<RemoteHandle> {
        let metadata = match handle {
            Some(_) => serde_json::json!({ "name": name }),
            None => serde_json::json!({ "name": name, "parents": [APP_DATA_FOLDER] }),
        };
        let body = RelatedBody::new(&metadata, &payload, "application/json");
        let url = self.upload_url(handle);
        let op = if handle.is_some() { "update" } else { "create" };
        let (url, body) = (url.as_str(), &body);

        let send = || async move {
            let request = match handle {
                Some(_) => self.http.patch(url),
                None => self.http.post(url),
            };
            let response = request
                .bearer_auth(&credential.token)
                .query(&[("uploadType", "multipart")])
                .header(reqwest::header::CONTENT_TYPE, body.content_type())
                .body(body.bytes())
                .send()
                .await
                .map_err(map_transport_error)?;
            let response = check_status(response).await?;
            response
                .json::<FileResource>()
                .await
                .map_err(|e| RemoteStoreError::Malformed(e.to_string()))
        };

        // A create that failed may still have landed remotely; resending it
        // could leave two objects under one name. The next attempt looks it up again.
        let created: FileResource = match handle {
            Some(_) => self.retry(op, send).await?,
            None => send().await?,
        };

        info!(op, name, id = %created.id, bytes = payload.len(), "remote object uploaded");
        Ok(RemoteHandle::new(created.id))
    }

    async fn download(
        &self,
        credential: &Credential,
        handle: &RemoteHandle,
    ) -> DriveResult<Vec<u8>> {
        let url = format!("{}/{}", self.files_url(), handle.as_str());
        let url = url.as_str();

        let bytes = self
            .retry("download", || async move {
                let response = self
                    .http
                    .get(url)
                    .bearer_auth(&credential.token)
                    .query(&[("alt", "media")])
                    .send()
                    .await
                    .map_err(map_transport_error)?;
                let response = check_status(response).await?;
                response
                    .bytes()
                    .await
                    .map_err(|e| RemoteStoreError::Network(format!("read body failed: {}", e)))
            })
            .await?;

        debug!(id = %handle, bytes = bytes.len(), "remote object downloaded");
        Ok(bytes.to_vec())
    }
}

fn should_retry(err: &RemoteStoreError) -> bool {
    matches!(err, RemoteStoreError::Network(_))
}

fn map_transport_error(err: reqwest::Error) -> RemoteStoreError {
    RemoteStoreError::Network(err.to_string())
}

async fn check_status(response: reqwest::Response) -> DriveResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(map_status_code(status, body))
}

fn map_status_code(code: StatusCode, body: String) -> RemoteStoreError {
    match code {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RemoteStoreError::Unauthorized(code.as_u16())
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            RemoteStoreError::Network(format!("status {}", code))
        }
        _ if code.is_server_error() => RemoteStoreError::Network(format!("server error: {}", code)),
        _ => RemoteStoreError::UnexpectedStatus {
            status: code.as_u16(),
            body,
        },
    }
}

/// Escape a literal for a Drive `q` expression.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
