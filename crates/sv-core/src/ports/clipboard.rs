use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardReadError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard access denied")]
    PermissionDenied,
}

/// Read-only view of the system clipboard.
///
/// 系统剪贴板的只读视图。
pub trait SystemClipboardPort: Send + Sync {
    /// Current text content; `Ok(None)` when the clipboard holds no text.
    fn read_text(&self) -> Result<Option<String>, ClipboardReadError>;
}
