//! Tag models.

use advstore_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
}

/// A tag with its approved-adventure usage count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PopularTag {
    pub id: DbId,
    pub name: String,
    pub adventure_count: i64,
}
