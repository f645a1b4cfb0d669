//! Host browser seam: the live tab event source and command sink.

use serde::{Deserialize, Serialize};

use crate::types::errors::HostError;
use crate::types::tab::{TabChanges, TabId, TabInfo, WindowId, WindowType};

pub mod simulated;

pub use simulated::SimulatedHost;

/// Filter for `TabHost::query_tabs`. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabQuery {
    pub window_id: Option<WindowId>,
    pub window_type: Option<WindowType>,
}

/// Events emitted by the host for live tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TabEvent {
    Created { tab: TabInfo },
    #[serde(rename_all = "camelCase")]
    Removed { tab_id: TabId, window_id: WindowId },
    #[serde(rename_all = "camelCase")]
    Updated { tab_id: TabId, changes: TabChanges },
    #[serde(rename_all = "camelCase")]
    Activated { tab_id: TabId, window_id: WindowId },
}

/// Query and command operations offered by the host browser.
pub trait TabHost {
    /// Lists live tabs matching `filter`, in the host's enumeration order.
    fn query_tabs(&self, filter: &TabQuery) -> Result<Vec<TabInfo>, HostError>;
    /// Opens a background tab. The host also emits a `Created` event for it.
    fn create_tab(&mut self, url: &str, window_id: Option<WindowId>) -> Result<TabInfo, HostError>;
    /// Closes tabs. The host emits one `Removed` event per tab.
    fn remove_tabs(&mut self, ids: &[TabId]) -> Result<(), HostError>;
    fn activate_tab(&mut self, id: TabId) -> Result<(), HostError>;
    fn focus_window(&mut self, id: WindowId) -> Result<(), HostError>;
}
