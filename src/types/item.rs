use serde::{Deserialize, Serialize};

use super::tab::TabId;

/// Fixed group color palette, in assignment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl GroupColor {
    pub const PALETTE: [GroupColor; 9] = [
        GroupColor::Grey,
        GroupColor::Blue,
        GroupColor::Red,
        GroupColor::Yellow,
        GroupColor::Green,
        GroupColor::Pink,
        GroupColor::Purple,
        GroupColor::Cyan,
        GroupColor::Orange,
    ];
}

/// A named, colored, ordered cluster of tab references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub color: GroupColor,
    pub tabs: Vec<TabId>,
    #[serde(default)]
    pub auto_save: bool,
    #[serde(default)]
    pub linked_session_id: Option<String>,
    #[serde(default)]
    pub collapsed: bool,
}

impl Group {
    pub fn contains(&self, tab: TabId) -> bool {
        self.tabs.contains(&tab)
    }

    /// Whether changes to this group should be re-snapshotted into its session.
    pub fn autosaves(&self) -> bool {
        self.auto_save && self.linked_session_id.is_some()
    }
}

/// One top-level entry of the ordering: a bare tab or a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    Tab { id: TabId },
    Group(Group),
}

impl Item {
    pub fn tab(id: TabId) -> Self {
        Item::Tab { id }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Item::Group(group) => Some(group),
            Item::Tab { .. } => None,
        }
    }
}

/// Where inserted content lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Destination {
    Root { index: usize },
    #[serde(rename_all = "camelCase")]
    IntoGroup { group_id: String, index: usize },
}
