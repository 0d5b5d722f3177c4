//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infra implementations (file stores, Drive, OAuth) / 创建 infra 层具体实现
//! - ✅ Create platform implementations (clipboard, keyring, host channel) / 创建 platform 层具体实现
//! - ✅ Hand everything to the engine as ports / 以 Port 形式注入引擎
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//! ❌ **No configuration validation / 禁止做配置验证**
//!
//! > **This is the only place allowed to depend on sv-infra + sv-platform + sv-app simultaneously.**
//! > **这是唯一允许同时依赖 sv-infra、sv-platform 和 sv-app 的地方。**

use std::sync::Arc;

use sv_app::EngineDeps;
use sv_core::config::AppConfig;
use sv_core::ports::{AuthorizationPromptPort, GrantStorePort};
use sv_infra::{
    DriveClient, FileSettingsStore, FileSnippetRepository, OAuthCredentialProvider, SystemClock,
};
use sv_platform::app_dirs::active_profile;
use sv_platform::{ArboardClipboard, HostChannelNotifier, HostRequest, KeyringGrantStore};
use tokio::sync::mpsc;

use super::paths::AppPaths;

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误（基础设施初始化失败）
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Remote store client initialization failed: {0}")]
    RemoteClient(String),

    #[error("Credential provider initialization failed: {0}")]
    CredentialProvider(String),
}

/// Everything the process needs after wiring.
pub struct Wired {
    pub deps: EngineDeps,
    /// Kept concrete so the bridge can forward the host's permission answer.
    pub notifier: Arc<HostChannelNotifier>,
}

/// Build every adapter and group them for [`sv_app::Engine::new`].
///
/// Host requests (notifications, authorization prompts) are sent on `host_tx`.
pub fn wire_dependencies(
    config: &AppConfig,
    paths: &AppPaths,
    host_tx: mpsc::Sender<HostRequest>,
) -> WiringResult<Wired> {
    let notifier = Arc::new(HostChannelNotifier::new(host_tx));

    let remote = DriveClient::new(&config.remote)
        .map_err(|e| WiringError::RemoteClient(e.to_string()))?;

    let grants: Arc<dyn GrantStorePort> = Arc::new(KeyringGrantStore::new(active_profile()));
    let prompt: Arc<dyn AuthorizationPromptPort> = notifier.clone();
    let credentials = OAuthCredentialProvider::new(
        config.oauth.clone(),
        config.remote.timeout(),
        grants,
        prompt,
    )
    .map_err(|e| WiringError::CredentialProvider(e.to_string()))?;

    let deps = EngineDeps {
        snippets: Arc::new(FileSnippetRepository::new(&paths.snippets_file)),
        settings: Arc::new(FileSettingsStore::new(&paths.settings_file)),
        remote: Arc::new(remote),
        credentials: Arc::new(credentials),
        clipboard: Arc::new(ArboardClipboard::new()),
        notifier: notifier.clone(),
        clock: Arc::new(SystemClock),
    };

    Ok(Wired { deps, notifier })
}
