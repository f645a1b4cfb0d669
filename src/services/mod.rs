// tabkeeper services
// Stateless or near-stateless logic the engine composes: reconciliation, debouncing, settings, backup.

pub mod backup;
pub mod debounce;
pub mod reconciliation;
pub mod settings_engine;
