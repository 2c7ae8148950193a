//! JSON collections on top of a key-value backend.
//!
//! A collection is read and written whole. Reads never fail: a missing key,
//! an unreadable backend or a value that does not decode all yield the
//! caller's fallback. Writes report backend failures.

use std::sync::{Arc, Mutex};

use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::Storage;

/// Key of the confession collection. The suffix is the schema version.
pub const CONFESSIONS_KEY: &str = "sm_confessions_v1";
/// Key of the habit collection.
pub const HABITS_KEY: &str = "sm_habits_v1";

#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn Storage>,
    write_lock: Arc<Mutex<()>>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn Storage>) -> Self {
        Self {
            backend,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.backend.get(key) {
            Ok(raw) => decode(key, raw, fallback),
            Err(e) => {
                error!("Reading {} failed, using fallback: {}", key, e);
                fallback
            }
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)?;
        debug!("Persisted {} ({} byte(s))", key, raw.len());
        Ok(())
    }

    /// Read-modify-write of a whole collection.
    ///
    /// `apply` returns its result plus whether the collection changed; the
    /// collection is written back only in that case. Updates through clones
    /// of the same `RecordStore` are serialized. A backend read failure is
    /// returned as-is and nothing is written.
    pub fn update<T, R, F>(&self, key: &str, apply: F) -> Result<R, StorageError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> (R, bool),
    {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let raw = self.backend.get(key)?;
        let mut items: Vec<T> = decode(key, raw, Vec::new());
        let (result, changed) = apply(&mut items);
        if changed {
            self.write(key, &items)?;
        }
        Ok(result)
    }
}

/// Absent or undecodable values yield `fallback`.
fn decode<T: DeserializeOwned>(key: &str, raw: Option<String>, fallback: T) -> T {
    let Some(raw) = raw else {
        return fallback;
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Stored value for {} is corrupt, using fallback: {}", key, e);
            fallback
        }
    }
}
