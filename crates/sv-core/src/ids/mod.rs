//! ID type wrappers for type safety.

mod id_macro;
pub mod remote_handle;
pub mod snippet_id;

pub use remote_handle::RemoteHandle;
pub use snippet_id::{NotificationId, SnippetId};
