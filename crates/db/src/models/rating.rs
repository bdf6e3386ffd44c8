//! Rating models.

use advstore_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `ratings` table. One per (adventure, user).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rating {
    pub id: DbId,
    pub adventure_id: DbId,
    pub user_id: DbId,
    pub rating: i32,
    pub created_at: Timestamp,
}
