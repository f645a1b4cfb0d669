use serde::{Deserialize, Serialize};

/// Backup format version written by `export_backup`.
pub const BACKUP_VERSION: u32 = 1;

/// Exported snapshot of the whole persistent store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Backup {
    pub version: u32,
    pub timestamp: i64,
    pub data: serde_json::Map<String, serde_json::Value>,
}
