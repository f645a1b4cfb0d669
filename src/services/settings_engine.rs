// tabkeeper Settings Engine
// Manages panel settings: loading, saving, updating individual values, and resetting to defaults.
// Settings are stored as one JSON object under the `settings` store key.

use serde_json::Value;
use tracing::warn;

use crate::store::{keys, Record, Store};
use crate::types::errors::SettingsError;
use crate::types::settings::PanelSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self, store: &dyn Store) -> Result<PanelSettings, SettingsError>;
    fn save(&self, store: &mut dyn Store) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &PanelSettings;
    fn set_value(&mut self, store: &mut dyn Store, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self, store: &mut dyn Store) -> Result<(), SettingsError>;
}

/// Settings engine holding the in-memory copy of the panel settings.
#[derive(Debug, Default)]
pub struct SettingsEngine {
    settings: PanelSettings,
}

impl SettingsEngine {
    pub fn new() -> Self {
        Self {
            settings: PanelSettings::default(),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the store.
    ///
    /// Missing settings yield defaults. Malformed settings also yield defaults
    /// (logged), since persisted state is never rejected.
    fn load(&mut self, store: &dyn Store) -> Result<PanelSettings, SettingsError> {
        let record = store.get(&[keys::SETTINGS])?;

        self.settings = match record.get(keys::SETTINGS) {
            None => PanelSettings::default(),
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warn!(error = %e, "malformed settings, using defaults");
                PanelSettings::default()
            }),
        };
        Ok(self.settings.clone())
    }

    fn save(&self, store: &mut dyn Store) -> Result<(), SettingsError> {
        let value = serde_json::to_value(&self.settings)
            .map_err(|e| SettingsError::InvalidValue(e.to_string()))?;
        let mut record = Record::new();
        record.insert(keys::SETTINGS.to_string(), value);
        store.set(record)?;
        Ok(())
    }

    fn get_settings(&self) -> &PanelSettings {
        &self.settings
    }

    /// Updates one setting by its persisted key name (e.g. `newTabPosition`).
    ///
    /// The new value is validated by deserializing the whole settings object
    /// back into `PanelSettings`. Saves to the store after a successful update.
    fn set_value(&mut self, store: &mut dyn Store, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut json_value = serde_json::to_value(&self.settings)
            .map_err(|e| SettingsError::InvalidValue(e.to_string()))?;

        match json_value.as_object_mut() {
            Some(map) if map.contains_key(key) => {
                map.insert(key.to_string(), value);
            }
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Key '{}' not found in settings",
                    key
                )))
            }
        }

        let new_settings: PanelSettings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;

        self.settings = new_settings;
        self.save(store)?;
        Ok(())
    }

    /// Resets all settings to defaults and saves.
    fn reset(&mut self, store: &mut dyn Store) -> Result<(), SettingsError> {
        self.settings = PanelSettings::default();
        self.save(store)
    }
}
