//! tabkeeper database layer.
//!
//! Provides SQLite connection management and schema migrations for the
//! SQLite-backed store.
//!
//! # Usage
//!
//! ```no_run
//! use tabkeeper::database::Database;
//!
//! let db = Database::open("tabkeeper.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
