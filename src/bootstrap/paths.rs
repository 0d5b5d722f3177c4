//! # Application Paths / 应用路径
//!
//! Derives every file location from the resolved [`AppDirs`]. Nothing is
//! created here; stores create their parent directories on first write.

use std::path::PathBuf;

use anyhow::Context;
use sv_core::app_dirs::AppDirs;
use sv_core::ports::AppDirsPort;
use sv_platform::DirsAppDirsAdapter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub snippets_file: PathBuf,
    pub settings_file: PathBuf,
    pub config_file: PathBuf,
    pub logs_dir: PathBuf,
}

impl AppPaths {
    pub fn from_app_dirs(dirs: &AppDirs) -> Self {
        Self {
            snippets_file: dirs.app_data_root.join("snippets.json"),
            settings_file: dirs.app_config_root.join("settings.json"),
            config_file: dirs.app_config_root.join("config.toml"),
            logs_dir: dirs.app_data_root.join("logs"),
        }
    }
}

/// Resolve the per-user directories, or keep everything under `data_dir`.
pub fn resolve_app_dirs(data_dir: Option<PathBuf>) -> anyhow::Result<AppDirs> {
    let adapter = match data_dir {
        Some(base) => DirsAppDirsAdapter::with_base_dir(base),
        None => DirsAppDirsAdapter::new(),
    };
    adapter
        .get_app_dirs()
        .context("Failed to resolve application directories")
}
