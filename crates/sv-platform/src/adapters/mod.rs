pub mod clipboard;
pub mod host_notifier;

pub use clipboard::ArboardClipboard;
pub use host_notifier::HostChannelNotifier;
