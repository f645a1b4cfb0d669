//! Multi-select and keyboard focus over the flattened ordering.
//!
//! Transient state, never persisted. Every operation takes the current
//! `flatten()` order so it stays independent of rendering.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::tab::TabId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickKind {
    Plain,
    Toggle,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    selected: HashSet<TabId>,
    last_clicked: Option<TabId>,
    focused: Option<TabId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click(&mut self, tab: TabId, kind: ClickKind, order: &[TabId]) {
        match kind {
            ClickKind::Plain => {
                self.selected.clear();
                self.last_clicked = Some(tab);
                self.focused = Some(tab);
            }
            ClickKind::Toggle => {
                if self.selected.is_empty() {
                    if let Some(previous) = self.last_clicked.filter(|p| *p != tab) {
                        self.selected.insert(previous);
                    }
                }
                if !self.selected.remove(&tab) {
                    self.selected.insert(tab);
                }
                self.last_clicked = Some(tab);
                self.focused = Some(tab);
            }
            ClickKind::Range => {
                let Some(anchor) = self.last_clicked else {
                    return;
                };
                let from = order.iter().position(|t| *t == anchor);
                let to = order.iter().position(|t| *t == tab);
                let (Some(from), Some(to)) = (from, to) else {
                    return;
                };
                let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
                self.selected.extend(order[lo..=hi].iter().copied());
                self.focused = Some(tab);
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Moves focus one step, clamped at both ends. Returns the new focus when it changed.
    pub fn move_focus(&mut self, direction: FocusDirection, order: &[TabId]) -> Option<TabId> {
        if order.is_empty() {
            return None;
        }
        let current = self.focused.and_then(|f| order.iter().position(|t| *t == f));
        let next = match (current, direction) {
            (None, FocusDirection::Down) => 0,
            (None, FocusDirection::Up) => order.len() - 1,
            (Some(i), FocusDirection::Down) => (i + 1).min(order.len() - 1),
            (Some(i), FocusDirection::Up) => i.saturating_sub(1),
        };
        if current == Some(next) {
            return None;
        }
        self.focused = Some(order[next]);
        self.focused
    }

    /// Drops every trace of a closed tab.
    pub fn forget(&mut self, tab: TabId) {
        self.selected.remove(&tab);
        if self.last_clicked == Some(tab) {
            self.last_clicked = None;
        }
        if self.focused == Some(tab) {
            self.focused = None;
        }
    }

    pub fn is_selected(&self, tab: TabId) -> bool {
        self.selected.contains(&tab)
    }

    /// Selected tabs in the given structural order.
    pub fn selected_in(&self, order: &[TabId]) -> Vec<TabId> {
        order.iter().copied().filter(|t| self.selected.contains(t)).collect()
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    pub fn last_clicked(&self) -> Option<TabId> {
        self.last_clicked
    }

    pub fn focused(&self) -> Option<TabId> {
        self.focused
    }
}
