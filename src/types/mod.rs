// tabkeeper shared type definitions
// Each submodule defines types used across the engine, store and host seams.

pub mod backup;
pub mod errors;
pub mod item;
pub mod session;
pub mod settings;
pub mod tab;
