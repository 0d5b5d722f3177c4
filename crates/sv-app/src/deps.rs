//! # Engine Dependencies / 引擎依赖
//!
//! Parameter grouping for [`crate::Engine`] construction. Not a builder:
//! every port is required and nothing is defaulted.

use std::sync::Arc;
use sv_core::ports::*;

pub struct EngineDeps {
    // Storage dependencies / 存储依赖
    pub snippets: Arc<dyn SnippetRepositoryPort>,
    pub settings: Arc<dyn SettingsStorePort>,

    // Remote dependencies / 远端依赖
    pub remote: Arc<dyn RemoteStorePort>,
    pub credentials: Arc<dyn CredentialProviderPort>,

    // Platform dependencies / 平台依赖
    pub clipboard: Arc<dyn SystemClipboardPort>,
    pub notifier: Arc<dyn NotificationPort>,
    pub clock: Arc<dyn ClockPort>,
}
