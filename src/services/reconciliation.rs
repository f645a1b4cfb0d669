//! Reconciliation of the ordering against the live tab set.
//!
//! The host's own tab order is never adopted: only membership is synced.
//! New tabs are placed according to the `newTabPosition` setting.

use std::collections::HashSet;

use crate::managers::ordering_manager::OrderingModel;
use crate::types::item::Destination;
use crate::types::settings::NewTabPosition;
use crate::types::tab::{TabId, TabInfo};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub removed: Vec<TabId>,
    pub added: Vec<TabId>,
}

impl SyncReport {
    pub fn changed(&self) -> bool {
        !self.removed.is_empty() || !self.added.is_empty()
    }
}

/// Startup sync: drop tabs that are gone, then add unknown live tabs as one
/// block in enumeration order at the top or bottom. Idempotent.
pub fn startup_sync(model: &mut OrderingModel, live: &[TabId], position: NewTabPosition) -> SyncReport {
    let live_set: HashSet<TabId> = live.iter().copied().collect();
    let removed = model.retain_live(&live_set);

    let mut seen = HashSet::new();
    let added: Vec<TabId> = live
        .iter()
        .copied()
        .filter(|t| !model.contains(*t) && seen.insert(*t))
        .collect();

    if !added.is_empty() {
        let index = match position {
            NewTabPosition::Top => 0,
            NewTabPosition::Bottom => model.items().len(),
        };
        model.insert_tabs(&added, &Destination::Root { index });
    }

    SyncReport { removed, added }
}

/// Where a newly created tab goes: into its opener's group when the opener
/// is grouped, otherwise at the root; front or back per the setting.
pub fn placement_for_new_tab(model: &OrderingModel, tab: &TabInfo, position: NewTabPosition) -> Destination {
    let opener_group = tab
        .opener_tab_id
        .and_then(|opener| model.find_group_containing(opener));

    match (opener_group, position) {
        (Some(group), NewTabPosition::Top) => Destination::IntoGroup {
            group_id: group.id.clone(),
            index: 0,
        },
        (Some(group), NewTabPosition::Bottom) => Destination::IntoGroup {
            group_id: group.id.clone(),
            index: group.tabs.len(),
        },
        (None, NewTabPosition::Top) => Destination::Root { index: 0 },
        (None, NewTabPosition::Bottom) => Destination::Root {
            index: model.items().len(),
        },
    }
}

/// Removes a batch of closed tabs in one pass. Returns the ids of groups that
/// lost members but survived.
pub fn remove_batch(model: &mut OrderingModel, closed: &[TabId]) -> Vec<String> {
    let mut touched = Vec::new();
    for tab in closed {
        if let Some(removal) = model.remove_tab(*tab) {
            if let (Some(group_id), false) = (removal.group_id, removal.group_removed) {
                if !touched.contains(&group_id) {
                    touched.push(group_id);
                }
            }
        }
    }
    // A later removal in the batch may have emptied an earlier survivor.
    touched.retain(|id| model.group(id).is_some());
    touched
}

