use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snippet::Snippet;

/// Remote snapshot: the whole snippet collection at the moment of upload.
///
/// Uploading replaces the remote object wholesale; there is no merge with a
/// prior remote snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSnapshot {
    pub snippets: Vec<Snippet>,
    pub last_synced: DateTime<Utc>,
}

impl RemoteSnapshot {
    pub fn new(snippets: Vec<Snippet>, last_synced: DateTime<Utc>) -> Self {
        Self {
            snippets,
            last_synced,
        }
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::Tag;
    use chrono::TimeZone;

    #[test]
    fn preserves_snippet_order() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let a = Snippet::new("A", vec![], now);
        let b = Snippet::new("B", vec![Tag::new("t", "🔖")], now);
        let snapshot = RemoteSnapshot::new(vec![a.clone(), b.clone()], now);

        let bytes = snapshot.to_json_bytes().unwrap();
        let parsed = RemoteSnapshot::from_json_bytes(&bytes).unwrap();

        assert_eq!(parsed.snippets, vec![a, b]);
        assert_eq!(parsed.last_synced, now);
    }

    #[test]
    fn uses_last_synced_field_name() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let value = serde_json::to_value(RemoteSnapshot::new(vec![], now)).unwrap();

        assert_eq!(value["snippets"], serde_json::json!([]));
        assert!(value.get("lastSynced").is_some());
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(RemoteSnapshot::from_json_bytes(b"{\"snippets\": 3}").is_err());
    }
}
