//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Read TOML configuration files / 读取 TOML 配置文件
//! - ✅ Parse TOML into AppConfig / 将 TOML 解析为 AppConfig
//! - ✅ Report I/O and parsing errors with context / 报告带上下文的 I/O 和解析错误
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No validation logic / 禁止验证逻辑**
//! ❌ **No business rules / 禁止业务规则**
//!
//! Missing keys fall back to the defaults declared on `AppConfig` itself.

use anyhow::Context;
use std::path::{Path, PathBuf};
use sv_core::config::AppConfig;
use tracing::info;

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read, is not valid TOML, or has
/// values of the wrong type.
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// Load an explicitly requested file, or the default file when it exists.
///
/// An explicit path must exist. A missing default file means built-in defaults.
pub fn load_or_default(
    explicit: Option<PathBuf>,
    default_path: &Path,
) -> anyhow::Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    if default_path.exists() {
        load_config(default_path.to_path_buf())
    } else {
        info!(path = %default_path.display(), "no config file, using defaults");
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Test that valid TOML is parsed correctly
    /// 测试有效 TOML 被正确解析
    #[test]
    fn test_load_config_reads_valid_toml() {
        let toml_content = r#"
            [remote]
            file_name = "team-backup.json"
            timeout_secs = 10

            [oauth]
            client_id = "client-123"

            [capture]
            poll_interval_secs = 5
            tag_name = "clip"

            [sync]
            default_interval_minutes = 15
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(temp_file.path().to_path_buf()).unwrap();

        assert_eq!(config.remote.file_name, "team-backup.json");
        assert_eq!(config.remote.timeout_secs, 10);
        assert_eq!(config.oauth.client_id, "client-123");
        assert_eq!(config.capture.poll_interval_secs, 5);
        assert_eq!(config.capture.tag_name, "clip");
        assert_eq!(config.sync.default_interval_minutes, 15);
    }

    /// Test that missing values fall back to defaults
    /// 测试缺失的值回退到默认值
    #[test]
    fn test_load_config_uses_defaults_when_missing() {
        let toml_content = r#"
            [remote]
            # file_name is missing
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(temp_file.path().to_path_buf()).unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_config_rejects_wrong_types() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[capture]\npoll_interval_secs = \"often\"\n")
            .unwrap();

        assert!(load_config(temp_file.path().to_path_buf()).is_err());
    }

    /// Test that non-existent files return IO error
    /// 测试不存在的文件返回 IO 错误
    #[test]
    fn test_load_config_returns_io_error_on_file_not_found() {
        let non_existent_path = PathBuf::from("/this/path/does/not/exist/config.toml");

        let err = load_config(non_existent_path).unwrap_err();

        assert!(
            err.to_string().to_lowercase().contains("failed to read"),
            "Expected IO error message, got: {}",
            err
        );
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = load_or_default(None, &dir.path().join("config.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("nope.toml");

        assert!(load_or_default(Some(explicit), &dir.path().join("config.toml")).is_err());
    }
}
