use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Immutable snippet identifier, generated once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnippetId(String);

/// Correlation id of an actionable notification raised for a pending capture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl_id!(SnippetId, NotificationId);
