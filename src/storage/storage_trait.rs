//! Storage Trait
//!
//! This module defines the `Storage` trait, the key-value interface every
//! persistence backend implements.
//!
//! Implementors of this trait are responsible for:
//! - Persisting a raw string value under a string key
//! - Returning the value last written for a key, or `None` when absent
//! - Removing keys
//!
//! Backends know nothing about confessions or habits. Encoding is the job of
//! `RecordStore`.

use crate::error_handling::types::StorageError;

/// The `Storage` trait defines the interface for key-value persistence backends.
///
/// All methods return a `Result` to handle potential storage errors.
pub trait Storage: Send + Sync {
    /// Returns the value stored under `key`, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Lists every key currently held by the backend, sorted.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
