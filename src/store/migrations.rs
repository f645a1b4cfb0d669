//! Versioned upward migrations of the persisted state shape.
//!
//! The applied version lives under the `schemaVersion` key. Each migration
//! runs exactly once; old shapes are never read again afterwards.

use serde_json::{json, Value};
use tracing::info;

use super::{keys, Record, Store};
use crate::types::errors::StoreError;

/// Current state version. Bump this when adding a new migration.
pub const CURRENT_STATE_VERSION: u64 = 1;

/// Returns the applied state version (0 for a store that predates versioning).
pub fn get_state_version<S: Store + ?Sized>(store: &S) -> Result<u64, StoreError> {
    Ok(store
        .get(&[keys::SCHEMA_VERSION])?
        .get(keys::SCHEMA_VERSION)
        .and_then(Value::as_u64)
        .unwrap_or(0))
}

/// Runs all pending migrations. Safe to call on every startup.
pub fn run_all<S: Store + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    let current = get_state_version(store)?;

    if current < 1 {
        migration_v1(store)?;
    }

    Ok(())
}

/// V1: wrap the legacy flat `tabOrder` id array into tagged `items` entries.
fn migration_v1<S: Store + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    let existing = store.get(&[keys::ITEMS, keys::LEGACY_TAB_ORDER])?;
    let mut record = Record::new();

    let legacy = existing.get(keys::LEGACY_TAB_ORDER).and_then(Value::as_array);
    if let (Some(order), None) = (legacy, existing.get(keys::ITEMS)) {
        let items: Vec<Value> = order
            .iter()
            .filter_map(legacy_tab_id)
            .map(|id| json!({"type": "tab", "id": id}))
            .collect();
        info!(count = items.len(), "migrated legacy tab order");
        record.insert(keys::ITEMS.to_string(), Value::Array(items));
    }

    record.insert(keys::SCHEMA_VERSION.to_string(), json!(1));
    store.set(record)?;
    if legacy.is_some() {
        store.remove(&[keys::LEGACY_TAB_ORDER])?;
    }
    Ok(())
}

/// Legacy entries were numbers, occasionally stringified.
fn legacy_tab_id(entry: &Value) -> Option<i64> {
    match entry {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
