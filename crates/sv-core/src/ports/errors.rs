use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppDirsError {
    #[error("system data directory not available")]
    DataDirUnavailable,

    #[error("system config directory not available")]
    ConfigDirUnavailable,

    #[error("app dirs error: {0}")]
    Other(String),
}
