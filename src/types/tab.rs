use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a live browser tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a browser window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub i64);

/// Kind of window a tab lives in. Only `Normal` windows are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    #[default]
    Normal,
    Popup,
    Panel,
    App,
    Devtools,
}

/// A live tab as reported by the host browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub window_type: WindowType,
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub active: bool,
    pub opener_tab_id: Option<TabId>,
}

/// Partial update delivered with a tab-updated event. `None` means unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabChanges {
    pub url: Option<String>,
    pub title: Option<String>,
    pub fav_icon_url: Option<String>,
}

impl TabChanges {
    /// Whether the change affects what a session snapshot would capture.
    pub fn is_navigation(&self) -> bool {
        self.url.is_some() || self.title.is_some()
    }
}

/// Ephemeral per-tab cache entry, rebuilt from host events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabMetadata {
    pub title: String,
    pub url: Option<String>,
    pub favicon: Option<String>,
    pub is_active: bool,
    pub window_id: WindowId,
}

impl From<&TabInfo> for TabMetadata {
    fn from(tab: &TabInfo) -> Self {
        Self {
            title: tab.title.clone(),
            url: tab.url.clone(),
            favicon: tab.fav_icon_url.clone(),
            is_active: tab.active,
            window_id: tab.window_id,
        }
    }
}
