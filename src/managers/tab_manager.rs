//! Tab metadata cache.
//!
//! Titles, URLs and favicons for live tabs, kept only for rendering and for
//! session snapshots. The ordering never depends on it.

use std::collections::HashMap;

use crate::types::tab::{TabChanges, TabId, TabInfo, TabMetadata, WindowId};

/// Cache of live tab metadata, mirrored from host events. Never persisted.
#[derive(Debug, Default)]
pub struct TabMetadataCache {
    entries: HashMap<TabId, TabMetadata>,
}

impl TabMetadataCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Replaces the whole cache with a fresh host enumeration.
    pub fn rebuild(&mut self, tabs: &[TabInfo]) {
        self.entries = tabs.iter().map(|t| (t.id, TabMetadata::from(t))).collect();
    }

    pub fn upsert(&mut self, tab: &TabInfo) {
        self.entries.insert(tab.id, TabMetadata::from(tab));
    }

    pub fn remove(&mut self, tab_id: TabId) -> Option<TabMetadata> {
        self.entries.remove(&tab_id)
    }

    /// Applies a partial update. Returns `false` for unknown tabs.
    pub fn apply_changes(&mut self, tab_id: TabId, changes: &TabChanges) -> bool {
        let Some(entry) = self.entries.get_mut(&tab_id) else {
            return false;
        };
        if let Some(url) = &changes.url {
            entry.url = Some(url.clone());
        }
        if let Some(title) = &changes.title {
            entry.title = title.clone();
        }
        if let Some(favicon) = &changes.fav_icon_url {
            entry.favicon = Some(favicon.clone());
        }
        true
    }

    /// Marks `tab_id` active and every other tab of its window inactive.
    pub fn set_active(&mut self, tab_id: TabId, window_id: WindowId) {
        for (id, entry) in self.entries.iter_mut() {
            if entry.window_id == window_id {
                entry.is_active = *id == tab_id;
            }
        }
    }

    pub fn get(&self, tab_id: TabId) -> Option<&TabMetadata> {
        self.entries.get(&tab_id)
    }

    /// URL usable for a session snapshot, if any.
    pub fn resolvable_url(&self, tab_id: TabId) -> Option<&str> {
        self.entries
            .get(&tab_id)
            .and_then(|m| m.url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }

    /// Number of live tabs with cached metadata.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unordered view of every entry, for the rendering layer's state snapshot.
    pub fn iter(&self) -> impl Iterator<Item = (&TabId, &TabMetadata)> {
        self.entries.iter()
    }
}
