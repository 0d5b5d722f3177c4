pub mod drive_client;
mod multipart;

pub use drive_client::DriveClient;
