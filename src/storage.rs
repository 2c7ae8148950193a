//! Storage subsystem
//!
//! This module provides abstractions and implementations for persisting the
//! confession and habit collections.
//!
//! Components:
//! - `storage_trait`: the Storage trait defining a uniform key-value API.
//! - `record_store`: JSON collections with fallback-on-corruption reads.
//! - `memory_storage`: in-process map, used by tests and ephemeral runs.
//! - `file_storage`: filesystem-backed implementation, one file per key.
//! - `database_storage`: SQLite implementation using SeaORM.
//! - `db_entities`: SeaORM entity model for the database backend.

pub mod database_storage;
pub mod db_entities;
pub mod file_storage;
pub mod memory_storage;
pub mod record_store;
pub mod storage_trait;

pub use database_storage::DatabaseStorage;
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use record_store::{RecordStore, CONFESSIONS_KEY, HABITS_KEY};
pub use storage_trait::Storage;
