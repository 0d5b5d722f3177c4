//! # sv-infra
//!
//! Adapters implementing the `sv-core` ports against the local filesystem,
//! the Drive v3 REST API and an OAuth 2.0 device-flow endpoint.

mod fs;
pub mod oauth;
pub mod remote;
pub mod settings;
pub mod snippets;
pub mod time;

pub use oauth::OAuthCredentialProvider;
pub use remote::DriveClient;
pub use settings::FileSettingsStore;
pub use snippets::FileSnippetRepository;
pub use time::SystemClock;
