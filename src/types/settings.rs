use serde::{Deserialize, Serialize};

/// User-facing panel settings, persisted under the `settings` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PanelSettings {
    #[serde(default)]
    pub new_tab_position: NewTabPosition,
    #[serde(default)]
    pub default_auto_save: bool,
}

/// Where newly discovered tabs are placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NewTabPosition {
    Top,
    #[default]
    Bottom,
}
