//! Persistent key/value store seam.
//!
//! The engine mirrors its owned state (ordering, custom names, saved sessions,
//! settings) into a [`Store`] as top-level JSON values. Every write emits one
//! [`StoreChange`] per key so a rendering layer can re-render.

use serde_json::Value;
use tokio::sync::broadcast;

use crate::types::errors::StoreError;

pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A set of top-level keys and their JSON values.
pub type Record = serde_json::Map<String, Value>;

/// Top-level key names.
pub mod keys {
    pub const ITEMS: &str = "items";
    pub const CUSTOM_NAMES: &str = "customNames";
    pub const SAVED_SESSIONS: &str = "savedSessions";
    pub const SETTINGS: &str = "settings";
    pub const SCHEMA_VERSION: &str = "schemaVersion";
    /// Flat id array written by the oldest panel versions.
    pub const LEGACY_TAB_ORDER: &str = "tabOrder";
}

/// Notification that a top-level key was written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
}

/// Capacity of the change-notification channel.
pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Durable key/value storage with change notifications.
pub trait Store {
    /// Reads the given keys. Missing keys are absent from the result.
    fn get(&self, keys: &[&str]) -> Result<Record, StoreError>;
    /// Reads every stored key.
    fn get_all(&self) -> Result<Record, StoreError>;
    /// Writes all entries of `record` as one write.
    fn set(&mut self, record: Record) -> Result<(), StoreError>;
    /// Deletes the given keys.
    fn remove(&mut self, keys: &[&str]) -> Result<(), StoreError>;
    /// Deletes everything.
    fn clear(&mut self) -> Result<(), StoreError>;
    /// Subscribes to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

pub(crate) fn notify(sender: &broadcast::Sender<StoreChange>, keys: impl IntoIterator<Item = String>) {
    for key in keys {
        // No receivers is fine.
        let _ = sender.send(StoreChange { key });
    }
}
