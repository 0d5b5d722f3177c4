mod request;

pub use request::HostRequest;
