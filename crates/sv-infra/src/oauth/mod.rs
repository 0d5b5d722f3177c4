pub mod device_flow;

pub use device_flow::OAuthCredentialProvider;
