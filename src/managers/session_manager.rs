//! Saved sessions for tabkeeper.
//!
//! A session is a URL-based snapshot of a group that outlives its tabs. The
//! book keeps sessions in creation order and is mirrored to the store under
//! the `savedSessions` key.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use super::tab_manager::TabMetadataCache;
use crate::types::item::Group;
use crate::types::session::{SavedSession, SessionTab};
use crate::types::tab::TabId;

/// Captures `{url, title, customName}` for each member with a resolvable URL.
pub fn snapshot_tabs(
    group: &Group,
    metadata: &TabMetadataCache,
    custom_names: &HashMap<TabId, String>,
) -> Vec<SessionTab> {
    group
        .tabs
        .iter()
        .filter_map(|tab| {
            let url = metadata.resolvable_url(*tab)?;
            let title = metadata.get(*tab).map(|m| m.title.clone()).unwrap_or_default();
            Some(SessionTab {
                url: url.to_string(),
                title,
                custom_name: custom_names.get(tab).cloned(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionBook {
    sessions: Vec<SavedSession>,
}

impl SessionBook {
    pub fn new() -> Self {
        Self { sessions: Vec::new() }
    }

    pub fn from_sessions(sessions: Vec<SavedSession>) -> Self {
        let mut book = Self::new();
        for session in sessions {
            if book.get(&session.id).is_none() {
                book.sessions.push(session);
            }
        }
        book
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    pub fn list(&self) -> &[SavedSession] {
        &self.sessions
    }

    pub fn get(&self, id: &str) -> Option<&SavedSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Writes a snapshot of `group` under `session_id` (a new id when `None`),
    /// overwriting in place and keeping `created_at`. Returns the session id.
    pub fn save_snapshot(&mut self, session_id: Option<&str>, group: &Group, tabs: Vec<SessionTab>) -> String {
        let now = Self::now();
        let id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.name = group.name.clone();
                session.color = group.color;
                session.auto_save = group.auto_save;
                session.tabs = tabs;
                session.updated_at = now.max(session.created_at);
            }
            None => self.sessions.push(SavedSession {
                id: id.clone(),
                name: group.name.clone(),
                color: group.color,
                auto_save: group.auto_save,
                created_at: now,
                updated_at: now,
                tabs,
            }),
        }
        id
    }

    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        let name = name.trim();
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) if !name.is_empty() => {
                session.name = name.to_string();
                session.updated_at = Self::now();
                true
            }
            _ => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> Option<SavedSession> {
        let index = self.sessions.iter().position(|s| s.id == id)?;
        Some(self.sessions.remove(index))
    }
}
