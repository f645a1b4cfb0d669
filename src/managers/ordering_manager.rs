//! Ordering Model for tabkeeper.
//!
//! An ordered sequence of [`Item`]s: bare tab references and groups of tab
//! references. Every tab appears at most once across the whole structure and
//! no group is ever empty. All removal goes through [`OrderingModel::remove_tab`].
//!
//! Destination indexes always refer to the model as it is *before* the call;
//! items that the call itself detaches are accounted for.

use std::collections::HashSet;

use tracing::warn;
use uuid::Uuid;

use crate::types::item::{Destination, Group, Item};
use crate::types::tab::TabId;

/// What `remove_tab` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// Group the tab was a member of, if any.
    pub group_id: Option<String>,
    /// Whether that group emptied and was removed.
    pub group_removed: bool,
    /// Root index of the tab item, or of its group.
    pub root_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderingModel {
    items: Vec<Item>,
}

impl OrderingModel {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Builds a model from persisted items, dropping duplicate tab references,
    /// empty groups and colliding group ids instead of rejecting the input.
    pub fn from_items(items: Vec<Item>) -> Self {
        let mut seen_tabs = HashSet::new();
        let mut seen_groups = HashSet::new();
        let mut clean = Vec::with_capacity(items.len());

        for item in items {
            match item {
                Item::Tab { id } => {
                    if seen_tabs.insert(id) {
                        clean.push(Item::Tab { id });
                    } else {
                        warn!(tab = %id, "dropping duplicate tab reference");
                    }
                }
                Item::Group(mut group) => {
                    group.tabs.retain(|t| seen_tabs.insert(*t));
                    if group.tabs.is_empty() {
                        warn!(group = %group.id, "dropping empty group");
                        continue;
                    }
                    if !seen_groups.insert(group.id.clone()) {
                        group.id = Uuid::new_v4().to_string();
                        seen_groups.insert(group.id.clone());
                    }
                    clean.push(Item::Group(group));
                }
            }
        }

        Self { items: clean }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every tab reference in visual order.
    pub fn flatten(&self) -> Vec<TabId> {
        let mut out = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match item {
                Item::Tab { id } => out.push(*id),
                Item::Group(group) => out.extend(group.tabs.iter().copied()),
            }
        }
        out
    }

    pub fn contains(&self, tab: TabId) -> bool {
        self.root_index_of(tab).is_some()
    }

    pub fn find_group_containing(&self, tab: TabId) -> Option<&Group> {
        self.groups().find(|g| g.contains(tab))
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.items.iter().filter_map(Item::as_group)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: &str) -> Option<&mut Group> {
        self.items.iter_mut().find_map(|item| match item {
            Item::Group(group) if group.id == id => Some(group),
            _ => None,
        })
    }

    pub fn group_index(&self, id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| matches!(item, Item::Group(g) if g.id == id))
    }

    /// Root index of the tab's own item, or of the group holding it.
    pub fn root_index_of(&self, tab: TabId) -> Option<usize> {
        self.items.iter().position(|item| match item {
            Item::Tab { id } => *id == tab,
            Item::Group(group) => group.contains(tab),
        })
    }

    /// Removes a tab wherever it is, removing its group if that empties it.
    pub fn remove_tab(&mut self, tab: TabId) -> Option<Removal> {
        self.detach(tab, None)
    }

    /// Shared removal path. `keep_group` survives even when emptied, so a move
    /// into a group can first take out that group's own members.
    fn detach(&mut self, tab: TabId, keep_group: Option<&str>) -> Option<Removal> {
        let root_index = self.root_index_of(tab)?;
        match &mut self.items[root_index] {
            Item::Tab { .. } => {
                self.items.remove(root_index);
                Some(Removal {
                    group_id: None,
                    group_removed: false,
                    root_index,
                })
            }
            Item::Group(group) => {
                group.tabs.retain(|t| *t != tab);
                let group_id = group.id.clone();
                let cascade = group.tabs.is_empty() && keep_group != Some(group_id.as_str());
                if cascade {
                    self.items.remove(root_index);
                }
                Some(Removal {
                    group_id: Some(group_id),
                    group_removed: cascade,
                    root_index,
                })
            }
        }
    }

    /// Drops any group left empty by a `detach` that kept it.
    fn prune_empty_groups(&mut self) {
        self.items
            .retain(|item| !matches!(item, Item::Group(g) if g.tabs.is_empty()));
    }

    /// Counts root items before `index` that detaching `tabs` would make vanish.
    fn vanishing_root_items_before(&self, index: usize, tabs: &HashSet<TabId>, keep_group: Option<&str>) -> usize {
        self.items
            .iter()
            .take(index)
            .filter(|item| match item {
                Item::Tab { id } => tabs.contains(id),
                Item::Group(group) => {
                    keep_group != Some(group.id.as_str()) && group.tabs.iter().all(|t| tabs.contains(t))
                }
            })
            .count()
    }

    /// Inserts tab references at `destination`, taking them out of their current
    /// positions first. Returns `false` when the target group no longer exists.
    pub fn insert_tabs(&mut self, tabs: &[TabId], destination: &Destination) -> bool {
        let mut unique = Vec::with_capacity(tabs.len());
        let mut set = HashSet::new();
        for tab in tabs {
            if set.insert(*tab) {
                unique.push(*tab);
            }
        }
        if unique.is_empty() {
            return false;
        }

        match destination {
            Destination::Root { index } => {
                let index = (*index).min(self.items.len());
                let shift = self.vanishing_root_items_before(index, &set, None);
                for tab in &unique {
                    self.remove_tab(*tab);
                }
                let at = (index - shift).min(self.items.len());
                self.items
                    .splice(at..at, unique.iter().map(|id| Item::tab(*id)));
                true
            }
            Destination::IntoGroup { group_id, index } => {
                let Some(group) = self.group(group_id) else {
                    return false;
                };
                let index = (*index).min(group.tabs.len());
                let shift = group.tabs.iter().take(index).filter(|t| set.contains(t)).count();

                for tab in &unique {
                    self.detach(*tab, Some(group_id.as_str()));
                }
                let Some(group) = self.group_mut(group_id) else {
                    return false;
                };
                let at = (index - shift).min(group.tabs.len());
                group.tabs.splice(at..at, unique.iter().copied());
                self.prune_empty_groups();
                true
            }
        }
    }

    /// Inserts a whole group at a root index. Its members are taken out of
    /// their current positions first; an empty group is not inserted.
    pub fn insert_group(&mut self, mut group: Group, index: usize) -> bool {
        let mut seen = HashSet::new();
        group.tabs.retain(|t| seen.insert(*t));
        if group.tabs.is_empty() || self.group(&group.id).is_some() {
            return false;
        }

        let index = index.min(self.items.len());
        let shift = self.vanishing_root_items_before(index, &seen, None);
        for tab in &group.tabs {
            self.remove_tab(*tab);
        }
        let at = (index - shift).min(self.items.len());
        self.items.insert(at, Item::Group(group));
        true
    }

    /// Relocates a group as one unit.
    pub fn move_group(&mut self, group_id: &str, index: usize) -> bool {
        let Some(from) = self.group_index(group_id) else {
            return false;
        };
        let item = self.items.remove(from);
        let index = index.min(self.items.len() + 1);
        let at = if index > from { index - 1 } else { index };
        self.items.insert(at.min(self.items.len()), item);
        true
    }

    /// Moves several tabs, keeping their current relative order regardless of
    /// the order they were given in. Unknown tabs are ignored.
    pub fn move_many(&mut self, tabs: &[TabId], destination: &Destination) -> bool {
        let wanted: HashSet<TabId> = tabs.iter().copied().collect();
        let ordered: Vec<TabId> = self
            .flatten()
            .into_iter()
            .filter(|t| wanted.contains(t))
            .collect();
        if ordered.is_empty() {
            return false;
        }
        self.insert_tabs(&ordered, destination)
    }

    /// Removes every tab not in `live`. Returns the removed references.
    pub fn retain_live(&mut self, live: &HashSet<TabId>) -> Vec<TabId> {
        let stale: Vec<TabId> = self
            .flatten()
            .into_iter()
            .filter(|t| !live.contains(t))
            .collect();
        for tab in &stale {
            self.remove_tab(*tab);
        }
        stale
    }

    /// Checks the structural invariants. Used by tests and debug assertions.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        let mut group_ids = HashSet::new();
        self.items.iter().all(|item| match item {
            Item::Tab { id } => seen.insert(*id),
            Item::Group(group) => {
                !group.tabs.is_empty()
                    && group_ids.insert(group.id.as_str())
                    && group.tabs.iter().all(|t| seen.insert(*t))
            }
        })
    }

    pub(crate) fn items_mut(&mut self) -> &mut Vec<Item> {
        &mut self.items
    }
}
