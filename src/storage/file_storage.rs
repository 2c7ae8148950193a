use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::Storage;

const RECORD_EXTENSION: &str = "json";

/// Filesystem backend: one `<key>.json` file per key under `base_path`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves either the old value or the new one.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).map_err(|e| { error!("Failed to create storage dir {}: {}", base_path.display(), e); StorageError::WriteFailed })?;
        info!("FileStorage initialized at {}", base_path.display());
        Ok(Self { base_path })
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_key(key) {
            error!("Refusing unsafe storage key {:?}", key);
            return Err(StorageError::ConnectionFailed);
        }
        Ok(self.base_path.join(format!("{}.{}", key, RECORD_EXTENSION)))
    }
}

/// Keys become file names, so only a conservative character set is allowed.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key)?;
        let mut content = String::new();
        match File::open(&path) {
            Ok(mut f) => {
                f.read_to_string(&mut content).map_err(|e| { error!("Read failed {}: {}", path.display(), e); StorageError::ReadFailed })?;
                debug!("Read {} byte(s) from {}", content.len(), path.display());
                Ok(Some(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                error!("Open failed {}: {}", path.display(), e);
                Err(StorageError::ReadFailed)
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        let tmp = path.with_extension(format!("{}.tmp", RECORD_EXTENSION));
        let mut f = File::create(&tmp).map_err(|e| { error!("Create failed {}: {}", tmp.display(), e); StorageError::WriteFailed })?;
        f.write_all(value.as_bytes()).map_err(|e| { error!("Write failed {}: {}", tmp.display(), e); StorageError::WriteFailed })?;
        f.sync_all().map_err(|e| { error!("Sync failed {}: {}", tmp.display(), e); StorageError::WriteFailed })?;
        fs::rename(&tmp, &path).map_err(|e| { error!("Rename {} -> {} failed: {}", tmp.display(), path.display(), e); StorageError::WriteFailed })?;
        debug!("Wrote {} byte(s) to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Remove failed {}: {}", path.display(), e);
                Err(StorageError::WriteFailed)
            }
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_path).map_err(|e| { error!("Failed to read storage dir {}: {}", self.base_path.display(), e); StorageError::ReadFailed })? {
            let entry = entry.map_err(|e| { error!("Dir entry error: {}", e); StorageError::ReadFailed })?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(RECORD_EXTENSION) { continue; }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) { keys.push(stem.to_string()); }
        }
        keys.sort();
        Ok(keys)
    }
}
