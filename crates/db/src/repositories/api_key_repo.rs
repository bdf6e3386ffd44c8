//! Repository for external API keys.
//!
//! Only the SHA-256 hash of a key is stored; lookups hash the presented
//! key and match on `key_hash`.

use sqlx::PgPool;

use advstore_core::types::DbId;

use crate::models::api_key::{ApiKey, CreateApiKey};

const COLUMNS: &str = "id, user_id, name, key_hash, key_prefix, is_active, created_at";

/// Provides API key issuance and lookup.
pub struct ApiKeyRepo;

impl ApiKeyRepo {
    pub async fn create(pool: &PgPool, input: &CreateApiKey) -> Result<ApiKey, sqlx::Error> {
        let query = format!(
            "INSERT INTO api_keys (user_id, name, key_hash, key_prefix) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.key_hash)
            .bind(&input.key_prefix)
            .fetch_one(pool)
            .await
    }

    /// Authenticate a presented key by its hash. Revoked keys do not match.
    pub async fn find_active_by_hash(
        pool: &PgPool,
        key_hash: &str,
    ) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_keys WHERE key_hash = $1 AND is_active = TRUE"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(key_hash)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<ApiKey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM api_keys ORDER BY created_at DESC");
        sqlx::query_as::<_, ApiKey>(&query).fetch_all(pool).await
    }

    /// Activate or revoke a key. Returns `None` when the key does not exist.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<ApiKey>, sqlx::Error> {
        let query = format!(
            "UPDATE api_keys SET is_active = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiKey>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
