use tabkeeper::types::errors::*;

// === StoreError Tests ===

#[test]
fn store_error_serialization_display() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let msg = json_err.to_string();
    let err = StoreError::from(json_err);
    assert_eq!(err.to_string(), format!("Store serialization error: {}", msg));
}

#[test]
fn store_error_database_display() {
    let err = StoreError::from(rusqlite::Error::QueryReturnedNoRows);
    assert!(err.to_string().starts_with("Store database error: "));
}

// === HostError Tests ===

#[test]
fn host_error_display_variants() {
    assert_eq!(HostError::TabNotFound(7).to_string(), "Tab not found: 7");
    assert_eq!(HostError::WindowNotFound(2).to_string(), "Window not found: 2");
    assert_eq!(
        HostError::CreateFailed("about:blank".to_string()).to_string(),
        "Tab creation failed: about:blank"
    );
    assert_eq!(
        HostError::Unavailable("port closed".to_string()).to_string(),
        "Host unavailable: port closed"
    );
}

#[test]
fn host_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(HostError::TabNotFound(1));
    assert!(err.source().is_none());
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::InvalidKey("foo".to_string()).to_string(),
        "Invalid settings key: foo"
    );
    assert_eq!(
        SettingsError::InvalidValue("bar".to_string()).to_string(),
        "Invalid settings value: bar"
    );
}

// === EngineError Tests ===

#[test]
fn engine_error_is_transparent_over_sources() {
    let err = EngineError::from(HostError::WindowNotFound(4));
    assert_eq!(err.to_string(), "Window not found: 4");

    let err = EngineError::from(SettingsError::InvalidKey("x".to_string()));
    assert_eq!(err.to_string(), "Invalid settings key: x");
}

#[test]
fn engine_error_invalid_backup_display() {
    let err = EngineError::InvalidBackup("unsupported version 9".to_string());
    assert_eq!(err.to_string(), "Invalid backup: unsupported version 9");
}

#[test]
fn question_mark_converts_store_error_into_engine_error() {
    fn fails() -> Result<(), StoreError> {
        Err(StoreError::from(rusqlite::Error::InvalidQuery))
    }
    fn outer() -> Result<(), EngineError> {
        fails()?;
        Ok(())
    }
    assert!(matches!(outer(), Err(EngineError::Store(_))));
}
