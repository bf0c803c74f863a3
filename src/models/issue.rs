use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One issue as reported by `bd ... --json`.
///
/// Only the fields the UI filters and sorts on are typed; everything else the
/// store attaches rides along in `extra` and is echoed back unchanged, since
/// the issue wire format is owned by the store, not by this UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Issue {
    /// Case-insensitive status match, the way the store's status values are
    /// compared everywhere in the UI.
    pub fn has_status(&self, status: &str) -> bool {
        self.status.eq_ignore_ascii_case(status)
    }
}
