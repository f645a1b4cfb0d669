//! In-memory host used by tests and embedders without a real browser.
//!
//! Every mutation, whether issued through [`TabHost`] or through the
//! user-gesture helpers, queues the event a real browser would emit.
//! Callers pump those events into the engine with [`SimulatedHost::drain_events`].

use std::collections::HashSet;

use super::{TabEvent, TabHost, TabQuery};
use crate::types::errors::HostError;
use crate::types::tab::{TabChanges, TabId, TabInfo, WindowId, WindowType};

pub struct SimulatedHost {
    tabs: Vec<TabInfo>,
    next_id: i64,
    default_window: WindowId,
    events: Vec<TabEvent>,
    failing_urls: HashSet<String>,
    activated: Vec<TabId>,
    focused_windows: Vec<WindowId>,
    created_count: usize,
}

impl SimulatedHost {
    pub fn new(default_window: WindowId) -> Self {
        Self {
            tabs: Vec::new(),
            next_id: 1,
            default_window,
            events: Vec::new(),
            failing_urls: HashSet::new(),
            activated: Vec::new(),
            focused_windows: Vec::new(),
            created_count: 0,
        }
    }

    fn allocate(&mut self, url: &str, window_id: WindowId, window_type: WindowType, opener: Option<TabId>) -> TabInfo {
        let tab = TabInfo {
            id: TabId(self.next_id),
            window_id,
            window_type,
            url: Some(url.to_string()),
            title: url.to_string(),
            fav_icon_url: None,
            active: false,
            opener_tab_id: opener,
        };
        self.next_id += 1;
        self.tabs.push(tab.clone());
        self.events.push(TabEvent::Created { tab: tab.clone() });
        tab
    }

    /// Simulates the user opening a tab in the default window.
    pub fn open_tab(&mut self, url: &str, opener: Option<TabId>) -> TabInfo {
        self.allocate(url, self.default_window, WindowType::Normal, opener)
    }

    /// Simulates a tab opening in another window or window kind.
    pub fn open_tab_in(&mut self, url: &str, window_id: WindowId, window_type: WindowType) -> TabInfo {
        self.allocate(url, window_id, window_type, None)
    }

    /// Simulates the user closing a tab.
    pub fn close_tab(&mut self, id: TabId) {
        if let Some(pos) = self.tabs.iter().position(|t| t.id == id) {
            let tab = self.tabs.remove(pos);
            self.events.push(TabEvent::Removed {
                tab_id: id,
                window_id: tab.window_id,
            });
        }
    }

    /// Simulates an in-tab navigation.
    pub fn navigate(&mut self, id: TabId, url: &str, title: &str) {
        if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == id) {
            tab.url = Some(url.to_string());
            tab.title = title.to_string();
            self.events.push(TabEvent::Updated {
                tab_id: id,
                changes: TabChanges {
                    url: Some(url.to_string()),
                    title: Some(title.to_string()),
                    fav_icon_url: None,
                },
            });
        }
    }

    /// Makes `create_tab` fail for this URL.
    pub fn fail_url(&mut self, url: &str) {
        self.failing_urls.insert(url.to_string());
    }

    pub fn drain_events(&mut self) -> Vec<TabEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn tab_ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }

    pub fn tab(&self, id: TabId) -> Option<&TabInfo> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Tabs created through `TabHost::create_tab`.
    pub fn created_count(&self) -> usize {
        self.created_count
    }

    pub fn activated(&self) -> &[TabId] {
        &self.activated
    }

    pub fn focused_windows(&self) -> &[WindowId] {
        &self.focused_windows
    }
}

impl TabHost for SimulatedHost {
    fn query_tabs(&self, filter: &TabQuery) -> Result<Vec<TabInfo>, HostError> {
        Ok(self
            .tabs
            .iter()
            .filter(|t| filter.window_id.map_or(true, |w| t.window_id == w))
            .filter(|t| filter.window_type.map_or(true, |k| t.window_type == k))
            .cloned()
            .collect())
    }

    fn create_tab(&mut self, url: &str, window_id: Option<WindowId>) -> Result<TabInfo, HostError> {
        if self.failing_urls.contains(url) {
            return Err(HostError::CreateFailed(url.to_string()));
        }
        self.created_count += 1;
        let window = window_id.unwrap_or(self.default_window);
        Ok(self.allocate(url, window, WindowType::Normal, None))
    }

    fn remove_tabs(&mut self, ids: &[TabId]) -> Result<(), HostError> {
        for id in ids {
            self.close_tab(*id);
        }
        Ok(())
    }

    fn activate_tab(&mut self, id: TabId) -> Result<(), HostError> {
        let window = {
            let tab = self
                .tabs
                .iter()
                .find(|t| t.id == id)
                .ok_or(HostError::TabNotFound(id.0))?;
            tab.window_id
        };
        for tab in self.tabs.iter_mut().filter(|t| t.window_id == window) {
            tab.active = tab.id == id;
        }
        self.activated.push(id);
        self.events.push(TabEvent::Activated {
            tab_id: id,
            window_id: window,
        });
        Ok(())
    }

    fn focus_window(&mut self, id: WindowId) -> Result<(), HostError> {
        if !self.tabs.iter().any(|t| t.window_id == id) && id != self.default_window {
            return Err(HostError::WindowNotFound(id.0));
        }
        self.focused_windows.push(id);
        Ok(())
    }
}
