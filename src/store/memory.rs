use std::collections::BTreeMap;

use serde_json::Value;
use tokio::sync::broadcast;

use super::{notify, Record, Store, StoreChange, CHANGE_CHANNEL_CAPACITY};
use crate::types::errors::StoreError;

/// In-memory store. Counts writes so callers can observe coalescing.
pub struct MemoryStore {
    data: BTreeMap<String, Value>,
    write_count: usize,
    sender: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            data: BTreeMap::new(),
            write_count: 0,
            sender,
        }
    }

    /// Creates a store pre-populated with `record`, without counting a write.
    pub fn with_record(record: Record) -> Self {
        let mut store = Self::new();
        store.data.extend(record);
        store
    }

    /// Number of `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<Record, StoreError> {
        Ok(keys
            .iter()
            .filter_map(|k| self.data.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    fn get_all(&self) -> Result<Record, StoreError> {
        Ok(self.data.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    fn set(&mut self, record: Record) -> Result<(), StoreError> {
        self.write_count += 1;
        let changed: Vec<String> = record.keys().cloned().collect();
        self.data.extend(record);
        notify(&self.sender, changed);
        Ok(())
    }

    fn remove(&mut self, keys: &[&str]) -> Result<(), StoreError> {
        let removed: Vec<String> = keys
            .iter()
            .filter(|k| self.data.remove(**k).is_some())
            .map(|k| k.to_string())
            .collect();
        notify(&self.sender, removed);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let removed: Vec<String> = std::mem::take(&mut self.data).into_keys().collect();
        notify(&self.sender, removed);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.sender.subscribe()
    }
}
