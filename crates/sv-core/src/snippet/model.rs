use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SnippetId;

/// A label attached to a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub emoji: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
        }
    }
}

/// A durable snippet.
///
/// The wire shape (camelCase) is shared by the local store and the remote
/// snapshot, so both sides round-trip the exact same JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: SnippetId,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Snippet {
    /// Build a new snippet with a freshly generated id.
    pub fn new(content: impl Into<String>, tags: Vec<Tag>, now: DateTime<Utc>) -> Self {
        Self {
            id: SnippetId::new(),
            content: content.into(),
            tags,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }
}
