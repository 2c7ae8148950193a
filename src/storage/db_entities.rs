//! SeaORM entity models used by the database storage backend.
//!
//! The backend keeps a single `records` table created by `database_storage`:
//! one row per storage key holding the JSON-encoded collection.

use sea_orm::entity::prelude::*;

/// Records table entity model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "records")]
pub struct Model {
    /// Storage key, e.g. `sm_confessions_v1`
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Serialized collection
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// RFC3339 timestamp of the last write
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
