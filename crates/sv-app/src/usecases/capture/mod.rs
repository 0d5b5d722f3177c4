//! Clipboard capture: the two-phase prompt and the direct context-menu path.

mod capture_selection;
mod watcher;

pub use capture_selection::CaptureSelection;
pub use watcher::{CaptureWatcher, Resolution, TickOutcome};
