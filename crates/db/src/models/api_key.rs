//! API key models.

use advstore_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `api_keys` table. Only the hash is stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiKey {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub key_prefix: String,
    pub name: String,
    pub user_id: DbId,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for storing a newly generated key.
#[derive(Debug, Clone)]
pub struct CreateApiKey {
    pub key_hash: String,
    pub key_prefix: String,
    pub name: String,
    pub user_id: DbId,
}
