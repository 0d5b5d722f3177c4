use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::ids::SnippetId;
use crate::snippet::Snippet;

#[derive(Debug, Error)]
pub enum SnippetRepositoryError {
    #[error("snippet storage io error: {0}")]
    Io(String),

    #[error("snippet storage corrupt: {0}")]
    Corrupt(String),
}

/// Emitted after every successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetsChanged {
    pub count: usize,
}

/// Ordered snippet collection; index 0 is the front.
///
/// 有序片段集合；索引 0 为最前。
///
/// Implementations serialize every read-modify-write so no mutation is lost
/// to a concurrent one.
#[async_trait]
pub trait SnippetRepositoryPort: Send + Sync {
    async fn list(&self) -> Result<Vec<Snippet>, SnippetRepositoryError>;

    /// Insert at the front as one atomic step.
    async fn prepend(&self, snippet: Snippet) -> Result<(), SnippetRepositoryError>;

    /// Replace the whole collection.
    async fn replace_all(&self, snippets: Vec<Snippet>) -> Result<(), SnippetRepositoryError>;

    /// Replace the snippet with the same id in place, or prepend it when absent.
    async fn upsert(&self, snippet: Snippet) -> Result<(), SnippetRepositoryError>;

    /// Returns whether a snippet was removed.
    async fn remove(&self, id: &SnippetId) -> Result<bool, SnippetRepositoryError>;

    fn subscribe(&self) -> broadcast::Receiver<SnippetsChanged>;
}
