//! tabkeeper: user-controlled tab ordering, grouping and saved sessions.
//!
//! The engine keeps a persisted ordering of tabs and groups consistent with a
//! live, externally mutating tab set, without ever adopting the host's own
//! tab order. This library crate exposes all modules for embedders and
//! integration tests.

pub mod database;
pub mod engine;
pub mod host;
pub mod managers;
pub mod rpc_handler;
pub mod runtime;
pub mod services;
pub mod store;
pub mod types;

pub use engine::{Engine, EngineConfig};
