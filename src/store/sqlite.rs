//! SQLite-backed store.
//!
//! Each top-level key is one row of `kv_store`, holding its JSON value as text.
//! A multi-key `set` runs in a single transaction.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::warn;

use super::{notify, Record, Store, StoreChange, CHANGE_CHANNEL_CAPACITY};
use crate::database::connection::Database;
use crate::types::errors::StoreError;

pub struct SqliteStore {
    db: Database,
    sender: broadcast::Sender<StoreChange>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self::from_database(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    pub fn from_database(db: Database) -> Self {
        let (sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { db, sender }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    /// Parses a stored value; a corrupt row is skipped rather than failing the read.
    fn parse(key: &str, text: &str) -> Option<Value> {
        match serde_json::from_str(text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "skipping unreadable store value");
                None
            }
        }
    }
}

impl Store for SqliteStore {
    fn get(&self, keys: &[&str]) -> Result<Record, StoreError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
        let mut record = Record::new();
        for key in keys {
            let text: Option<String> = stmt.query_row(params![key], |row| row.get(0)).optional()?;
            if let Some(value) = text.and_then(|t| Self::parse(key, &t)) {
                record.insert(key.to_string(), value);
            }
        }
        Ok(record)
    }

    fn get_all(&self) -> Result<Record, StoreError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare("SELECT key, value FROM kv_store ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut record = Record::new();
        for row in rows {
            let (key, text) = row?;
            if let Some(value) = Self::parse(&key, &text) {
                record.insert(key, value);
            }
        }
        Ok(record)
    }

    fn set(&mut self, record: Record) -> Result<(), StoreError> {
        let now = Self::now();
        let tx = self.db.connection().unchecked_transaction()?;
        for (key, value) in &record {
            let text = serde_json::to_string(value)?;
            tx.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, text, now],
            )?;
        }
        tx.commit()?;
        notify(&self.sender, record.into_iter().map(|(k, _)| k));
        Ok(())
    }

    fn remove(&mut self, keys: &[&str]) -> Result<(), StoreError> {
        let conn = self.db.connection();
        let mut removed = Vec::new();
        for key in keys {
            if conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])? > 0 {
                removed.push(key.to_string());
            }
        }
        notify(&self.sender, removed);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let existing: Vec<String> = self.get_all()?.into_iter().map(|(k, _)| k).collect();
        self.db.connection().execute("DELETE FROM kv_store", [])?;
        notify(&self.sender, existing);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.sender.subscribe()
    }
}
