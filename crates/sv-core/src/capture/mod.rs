//! Clipboard capture domain: pending prompts and their resolution.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Button labels of a capture notification, in index order.
pub const CAPTURE_BUTTONS: [&str; 2] = ["Save", "Ignore"];

/// Clipboard text waiting for the user's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCapture {
    pub text: String,
    pub raised_at: DateTime<Utc>,
}

impl PendingCapture {
    pub fn new(text: impl Into<String>, raised_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            raised_at,
        }
    }

    /// Whether the prompt has outlived `ttl` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.raised_at >= ttl,
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureAction {
    Save,
    Ignore,
}

impl CaptureAction {
    /// Button 0 saves; every other index discards.
    pub fn from_button(index: usize) -> Self {
        if index == 0 {
            CaptureAction::Save
        } else {
            CaptureAction::Ignore
        }
    }
}

/// Whether clipboard text is worth prompting about.
pub fn is_capturable(text: &str) -> bool {
    !text.trim().is_empty()
}
