//! # Configuration DTOs / 配置数据结构
//!
//! ## Responsibilities / 职责
//!
//! - Define configuration data structures / 定义配置数据结构
//! - Provide TOML → DTO mapping / 提供 TOML → DTO 的映射
//! - Own the fallback value of every key / 定义每个键的默认值
//!
//! Reading the file from disk belongs to the binary's bootstrap; this module
//! never touches the filesystem.

mod app_config;

pub use app_config::{AppConfig, CaptureConfig, OAuthConfig, RemoteConfig, SyncConfig};
