use serde::{Deserialize, Serialize};

use super::item::GroupColor;

/// Durable, URL-based snapshot of a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedSession {
    pub id: String,
    pub name: String,
    pub color: GroupColor,
    #[serde(default)]
    pub auto_save: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub tabs: Vec<SessionTab>,
}

/// A tab's state as stored in a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionTab {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
}

/// Result of asking the engine to restore a saved session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The session was already open; its group was focused instead.
    Focused { group_id: String },
    /// A new group was built from freshly created tabs.
    Restored { group_id: String, created: usize, failed: usize },
    /// No tab could be created, so no group was built.
    NothingRestored { failed: usize },
}
