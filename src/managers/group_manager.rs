//! Group lifecycle operations on the [`OrderingModel`].
//!
//! Stale group or tab references make every operation a no-op returning
//! `false`/`None`.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use uuid::Uuid;

use super::ordering_manager::OrderingModel;
use crate::types::item::{Group, GroupColor, Item};
use crate::types::tab::TabId;

pub const DEFAULT_GROUP_NAME: &str = "New group";

/// Picks a color for a new group given the colors of existing groups in root order.
///
/// First unused palette color; once all are taken, cycle by group count. A
/// random color is used only when the cycled one would sit next to an
/// identical color (the most recently placed group).
pub fn pick_color(existing: &[GroupColor]) -> GroupColor {
    if let Some(color) = GroupColor::PALETTE.iter().find(|c| !existing.contains(c)) {
        return *color;
    }
    let cycled = GroupColor::PALETTE[existing.len() % GroupColor::PALETTE.len()];
    if existing.last() != Some(&cycled) {
        return cycled;
    }
    let others: Vec<GroupColor> = GroupColor::PALETTE
        .iter()
        .copied()
        .filter(|c| *c != cycled)
        .collect();
    others
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(cycled)
}

impl OrderingModel {
    /// Groups the given tabs (kept in structural order) at the root position of
    /// the first of them. Returns the new group id.
    pub fn create_group(&mut self, tabs: &[TabId], name: &str, auto_save: bool) -> Option<String> {
        let wanted: HashSet<TabId> = tabs.iter().copied().collect();
        let ordered: Vec<TabId> = self
            .flatten()
            .into_iter()
            .filter(|t| wanted.contains(t))
            .collect();
        let index = self.root_index_of(*ordered.first()?)?;

        let colors: Vec<GroupColor> = self.groups().map(|g| g.color).collect();
        let name = name.trim();
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: if name.is_empty() { DEFAULT_GROUP_NAME.to_string() } else { name.to_string() },
            color: pick_color(&colors),
            tabs: ordered,
            auto_save,
            linked_session_id: None,
            collapsed: false,
        };
        let id = group.id.clone();
        self.insert_group(group, index).then_some(id)
    }

    /// Replaces the group with its members, in order, at its position.
    pub fn dissolve_group(&mut self, group_id: &str) -> Option<Vec<TabId>> {
        let index = self.group_index(group_id)?;
        let Item::Group(group) = self.items_mut().remove(index) else {
            return None;
        };
        let tabs = group.tabs;
        self.items_mut()
            .splice(index..index, tabs.iter().map(|id| Item::tab(*id)));
        Some(tabs)
    }

    /// Takes one tab out of a group and places it right after the group, or
    /// where the group was if it emptied.
    pub fn ungroup_tab(&mut self, tab: TabId, group_id: &str) -> bool {
        let Some(index) = self.group_index(group_id) else {
            return false;
        };
        if !self.group(group_id).is_some_and(|g| g.contains(tab)) {
            return false;
        }
        let Some(removal) = self.remove_tab(tab) else {
            return false;
        };
        let at = if removal.group_removed { index } else { index + 1 };
        let at = at.min(self.items().len());
        self.items_mut().insert(at, Item::tab(tab));
        true
    }

    pub fn rename_group(&mut self, group_id: &str, name: &str) -> bool {
        let name = name.trim();
        match self.group_mut(group_id) {
            Some(group) if !name.is_empty() => {
                group.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn set_group_color(&mut self, group_id: &str, color: GroupColor) -> bool {
        self.group_mut(group_id).map(|g| g.color = color).is_some()
    }

    pub fn set_group_collapsed(&mut self, group_id: &str, collapsed: bool) -> bool {
        self.group_mut(group_id).map(|g| g.collapsed = collapsed).is_some()
    }

    pub fn set_group_auto_save(&mut self, group_id: &str, auto_save: bool) -> bool {
        self.group_mut(group_id).map(|g| g.auto_save = auto_save).is_some()
    }

    /// Links the group to a session id, or unlinks it.
    pub fn link_group(&mut self, group_id: &str, session_id: Option<String>) -> bool {
        self.group_mut(group_id)
            .map(|g| g.linked_session_id = session_id)
            .is_some()
    }

    /// Unlinks every group pointing at `session_id`. Returns how many changed.
    pub fn unlink_session(&mut self, session_id: &str) -> usize {
        let mut count = 0;
        for item in self.items_mut().iter_mut() {
            if let Item::Group(group) = item {
                if group.linked_session_id.as_deref() == Some(session_id) {
                    group.linked_session_id = None;
                    count += 1;
                }
            }
        }
        count
    }

    pub fn group_linked_to(&self, session_id: &str) -> Option<&Group> {
        self.groups()
            .find(|g| g.linked_session_id.as_deref() == Some(session_id))
    }
}
