use std::sync::Mutex;

use sv_core::ports::{ClipboardReadError, SystemClipboardPort};
use tracing::debug;

/// System clipboard reader backed by `arboard`.
///
/// The handle is opened lazily and dropped after a failure so the next read
/// reconnects (X11/Wayland connections can go stale).
pub struct ArboardClipboard {
    inner: Mutex<Option<arboard::Clipboard>>,
}

impl ArboardClipboard {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

impl Default for ArboardClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClipboardPort for ArboardClipboard {
    fn read_text(&self) -> Result<Option<String>, ClipboardReadError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| ClipboardReadError::Unavailable("clipboard lock poisoned".to_string()))?;

        if guard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ClipboardReadError::Unavailable(e.to_string()))?;
            *guard = Some(clipboard);
        }
        let Some(clipboard) = guard.as_mut() else {
            return Ok(None);
        };

        match clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(err) => {
                debug!(error = %err, "clipboard read failed, dropping handle");
                *guard = None;
                Err(ClipboardReadError::Unavailable(err.to_string()))
            }
        }
    }
}
