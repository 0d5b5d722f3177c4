use std::path::PathBuf;

/// Resolved per-user directories. Pure facts; nothing is created here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub app_data_root: PathBuf,
    pub app_config_root: PathBuf,
}
