use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

/// Read a file, mapping a missing file to `None`.
pub(crate) async fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("read failed: {}", path.display())),
    }
}

/// Write `content` next to `path` and rename it into place.
///
/// Readers see either the previous contents or the complete new contents.
pub(crate) async fn atomic_write(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("create dir failed: {}", dir.display()))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content)
        .await
        .with_context(|| format!("write temp file failed: {}", tmp_path.display()))?;

    // TODO: Windows 上 rename 覆盖可能不一致；macOS/Linux OK。
    fs::rename(&tmp_path, path).await.with_context(|| {
        format!(
            "rename temp file to target failed: {} -> {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn read_optional_returns_none_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_optional(&dir.path().join("missing.json")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn atomic_write_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data.json");

        atomic_write(&path, "[1,2,3]").await.unwrap();

        assert_eq!(read_optional(&path).await.unwrap().as_deref(), Some("[1,2,3]"));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
