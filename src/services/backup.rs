//! Whole-store backup records.
//!
//! Export snapshots every stored key; import replaces the store wholesale.
//! The engine re-runs startup sync after an import.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::{keys, Store};
use crate::types::backup::{Backup, BACKUP_VERSION};
use crate::types::errors::EngineError;

pub fn export_backup(store: &dyn Store) -> Result<Backup, EngineError> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;
    Ok(Backup {
        version: BACKUP_VERSION,
        timestamp,
        data: store.get_all()?,
    })
}

/// Validates a backup and replaces the store's contents with it.
pub fn import_backup(store: &mut dyn Store, backup: Backup) -> Result<(), EngineError> {
    if backup.version == 0 || backup.version > BACKUP_VERSION {
        return Err(EngineError::InvalidBackup(format!(
            "unsupported version {}",
            backup.version
        )));
    }
    let has_state = [keys::ITEMS, keys::LEGACY_TAB_ORDER, keys::SAVED_SESSIONS, keys::SETTINGS]
        .iter()
        .any(|k| backup.data.contains_key(*k));
    if !has_state {
        return Err(EngineError::InvalidBackup("no recognised keys".to_string()));
    }

    store.clear()?;
    store.set(backup.data)?;
    Ok(())
}
