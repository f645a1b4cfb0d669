use thiserror::Error;

// === StoreError ===

/// Errors raised by a persistent store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("Store database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// A record could not be (de)serialized.
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// === HostError ===

/// Errors raised by the host browser's tab API.
#[derive(Debug, Error)]
pub enum HostError {
    /// The referenced tab no longer exists.
    #[error("Tab not found: {0}")]
    TabNotFound(i64),
    /// The referenced window no longer exists.
    #[error("Window not found: {0}")]
    WindowNotFound(i64),
    /// Tab creation was refused by the host.
    #[error("Tab creation failed: {0}")]
    CreateFailed(String),
    /// The host could not be reached.
    #[error("Host unavailable: {0}")]
    Unavailable(String),
}

// === SettingsError ===

/// Errors related to panel settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings key does not exist.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The value has the wrong type or is out of range.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    /// Reading or writing the store failed.
    #[error("Settings store error: {0}")]
    Store(#[from] StoreError),
}

// === EngineError ===

/// Infrastructure failures surfaced by the engine. Stale references never produce these.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// A backup record was unusable.
    #[error("Invalid backup: {0}")]
    InvalidBackup(String),
}
