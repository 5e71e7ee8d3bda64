//! On-device SQLite file backing `SqliteStore`.
//!
//! Opening a file runs the schema migrations below before any key-value
//! access. Errors surface as `StoreError`, since the store is the only
//! caller.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
