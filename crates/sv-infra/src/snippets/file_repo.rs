use std::path::PathBuf;

use async_trait::async_trait;
use sv_core::ids::SnippetId;
use sv_core::ports::{SnippetRepositoryError, SnippetRepositoryPort, SnippetsChanged};
use sv_core::snippet::Snippet;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::fs::{atomic_write, read_optional};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Snippet collection stored as one JSON array file.
///
/// JSON 数组文件形式存储的片段集合。
///
/// Every mutation runs read-modify-write under a single async mutex, so a
/// `prepend` racing a `replace_all` never drops either write. The lock only
/// covers this process; other writers of the same file are not coordinated.
pub struct FileSnippetRepository {
    path: PathBuf,
    lock: Mutex<()>,
    changes: broadcast::Sender<SnippetsChanged>,
}

impl FileSnippetRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            changes,
        }
    }

    async fn read_all(&self) -> Result<Vec<Snippet>, SnippetRepositoryError> {
        let content = read_optional(&self.path)
            .await
            .map_err(|e| SnippetRepositoryError::Io(format!("{:#}", e)))?;

        match content {
            None => Ok(Vec::new()),
            Some(content) if content.trim().is_empty() => Ok(Vec::new()),
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| SnippetRepositoryError::Corrupt(e.to_string())),
        }
    }

    async fn write_all(&self, snippets: &[Snippet]) -> Result<(), SnippetRepositoryError> {
        let content = serde_json::to_string_pretty(snippets)
            .map_err(|e| SnippetRepositoryError::Corrupt(e.to_string()))?;

        atomic_write(&self.path, &content)
            .await
            .map_err(|e| SnippetRepositoryError::Io(format!("{:#}", e)))
    }

    /// Apply `change` to the stored collection and persist it.
    async fn mutate<R, F>(&self, change: F) -> Result<R, SnippetRepositoryError>
    where
        F: FnOnce(&mut Vec<Snippet>) -> R + Send,
        R: Send,
    {
        let _guard = self.lock.lock().await;

        let mut snippets = self.read_all().await?;
        let result = change(&mut snippets);
        self.write_all(&snippets).await?;

        let count = snippets.len();
        debug!(count, path = %self.path.display(), "snippets written");
        // No receivers is fine.
        let _ = self.changes.send(SnippetsChanged { count });

        Ok(result)
    }
}

#[async_trait]
impl SnippetRepositoryPort for FileSnippetRepository {
    async fn list(&self) -> Result<Vec<Snippet>, SnippetRepositoryError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn prepend(&self, snippet: Snippet) -> Result<(), SnippetRepositoryError> {
        self.mutate(move |snippets| snippets.insert(0, snippet)).await
    }

    async fn replace_all(&self, snippets: Vec<Snippet>) -> Result<(), SnippetRepositoryError> {
        self.mutate(move |current| *current = snippets).await
    }

    async fn upsert(&self, snippet: Snippet) -> Result<(), SnippetRepositoryError> {
        self.mutate(move |snippets| {
            match snippets.iter_mut().find(|s| s.id == snippet.id) {
                Some(existing) => *existing = snippet,
                None => snippets.insert(0, snippet),
            }
        })
        .await
    }

    async fn remove(&self, id: &SnippetId) -> Result<bool, SnippetRepositoryError> {
        let id = id.clone();
        self.mutate(move |snippets| {
            let before = snippets.len();
            snippets.retain(|s| s.id != id);
            snippets.len() != before
        })
        .await
    }

    fn subscribe(&self) -> broadcast::Receiver<SnippetsChanged> {
        self.changes.subscribe()
    }
}
