use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Authorship and timestamp metadata carried by every node
///
/// Timestamps are optional because trees written before metadata existed
/// have none until the v0→v1 migration backfills them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub creator_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_author_id: String,
}

impl NodeMetadata {
    /// Metadata for a node created now by `user_id`
    pub fn created_by(user_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(at),
            updated_at: Some(at),
            creator_id: user_id.to_string(),
            last_author_id: user_id.to_string(),
        }
    }

    /// Record a modification by `user_id`
    pub fn touch(&mut self, user_id: &str, at: DateTime<Utc>) {
        if !is_set(&self.created_at) {
            self.created_at = Some(at);
        }
        if self.creator_id.is_empty() {
            self.creator_id = user_id.to_string();
        }
        self.updated_at = Some(at);
        self.last_author_id = user_id.to_string();
    }

    /// Both timestamps present and not the zero time (`0001-01-01T00:00:00Z`)
    pub fn has_timestamps(&self) -> bool {
        is_set(&self.created_at) && is_set(&self.updated_at)
    }
}

fn is_set(ts: &Option<DateTime<Utc>>) -> bool {
    matches!(ts, Some(t) if t.year() > 1)
}
