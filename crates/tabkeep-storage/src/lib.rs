//! TabKeep Storage Layer
//!
//! Whole-value persistence behind a small key-value interface.
//! Every write replaces the value under a key in one statement, so a
//! reader sees either the previous value or the new one.

mod database;
mod error;
mod memory;
mod migrations;
mod store;

pub use database::SqliteStore;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use store::KeyValueStore;

pub type Result<T> = std::result::Result<T, StorageError>;
