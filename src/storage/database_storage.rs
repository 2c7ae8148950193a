use std::path::Path;

use chrono::Utc;
use log::{error, info};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryOrder, QuerySelect,
};

use crate::error_handling::types::StorageError;
use crate::storage::db_entities::{self as records, Entity as Records};
use crate::storage::storage_trait::Storage;

/// SQLite backend built on SeaORM.
///
/// The `Storage` trait is synchronous, so the backend owns a current-thread
/// runtime and blocks on it. Do not call it from inside another tokio
/// runtime's worker threads; use `spawn_blocking`.
pub struct DatabaseStorage {
    db: DatabaseConnection,
    rt: tokio::runtime::Runtime,
}

impl DatabaseStorage {
    pub fn new_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| { error!("Failed to build database runtime: {}", e); StorageError::ConnectionFailed })?;
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            std::fs::create_dir_all(parent).map_err(|_| StorageError::WriteFailed)?;
        }
        let url = format!("sqlite://{}?mode=rwc", path_ref.display());
        let db = rt.block_on(async {
            let mut opts = ConnectOptions::new(url);
            opts.max_connections(5).sqlx_logging(false);
            let db = Database::connect(opts).await.map_err(|e| {
                error!("Failed to open database {}: {}", path_ref.display(), e);
                StorageError::ConnectionFailed
            })?;
            db.execute_unprepared(
                "CREATE TABLE IF NOT EXISTS records (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );",
            )
            .await
            .map_err(|e| { error!("Failed to create records table: {}", e); StorageError::WriteFailed })?;
            Ok::<_, StorageError>(db)
        })?;
        info!("DatabaseStorage initialized at {}", path_ref.display());
        Ok(Self { db, rt })
    }
}

impl Storage for DatabaseStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.rt.block_on(async {
            let row = Records::find_by_id(key.to_string())
                .one(&self.db)
                .await
                .map_err(|e| { error!("Failed to read record {}: {}", key, e); StorageError::ReadFailed })?;
            Ok(row.map(|r| r.value))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.rt.block_on(async {
            let row = records::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(Utc::now().to_rfc3339()),
            };
            Records::insert(row)
                .on_conflict(
                    OnConflict::column(records::Column::Key)
                        .update_columns([records::Column::Value, records::Column::UpdatedAt])
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await
                .map_err(|e| { error!("Failed to write record {}: {}", key, e); StorageError::WriteFailed })?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.rt.block_on(async {
            Records::delete_by_id(key.to_string())
                .exec(&self.db)
                .await
                .map_err(|e| { error!("Failed to delete record {}: {}", key, e); StorageError::WriteFailed })?;
            Ok(())
        })
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.rt.block_on(async {
            let keys: Vec<String> = Records::find()
                .select_only()
                .column(records::Column::Key)
                .order_by_asc(records::Column::Key)
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| { error!("Failed to list records: {}", e); StorageError::ReadFailed })?;
            Ok(keys)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_db() -> (TempDir, DatabaseStorage) {
        let dir = TempDir::new().unwrap();
        let storage = DatabaseStorage::new_file(dir.path().join("test.sqlite3")).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_db_set_get_overwrite() {
        let (_dir, storage) = temp_db();
        assert_eq!(storage.get("sm_confessions_v1").unwrap(), None);

        storage.set("sm_confessions_v1", "[]").unwrap();
        storage.set("sm_confessions_v1", r#"[{"id":"c1"}]"#).unwrap();
        assert_eq!(
            storage.get("sm_confessions_v1").unwrap().as_deref(),
            Some(r#"[{"id":"c1"}]"#)
        );
    }

    #[test]
    fn test_db_remove_and_keys() {
        let (_dir, storage) = temp_db();
        storage.set("sm_habits_v1", "[]").unwrap();
        storage.set("sm_confessions_v1", "[]").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["sm_confessions_v1", "sm_habits_v1"]);

        storage.remove("sm_habits_v1").unwrap();
        storage.remove("sm_habits_v1").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["sm_confessions_v1"]);
        assert_eq!(storage.get("sm_habits_v1").unwrap(), None);
    }

    #[test]
    fn test_db_value_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.sqlite3");
        DatabaseStorage::new_file(&path).unwrap().set("k", "[1,2]").unwrap();
        let reopened = DatabaseStorage::new_file(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("[1,2]"));
    }
}
