//! Repository for the external API audit log.

use sqlx::PgPool;

use crate::models::api_log::{ApiLog, CreateApiLog};

const COLUMNS: &str = "id, api_key_name, ip_address, endpoint, status_code, success, created_at";

/// Appends and reads external API audit entries.
pub struct ApiLogRepo;

impl ApiLogRepo {
    pub async fn insert(pool: &PgPool, input: &CreateApiLog) -> Result<ApiLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO api_logs (api_key_name, ip_address, endpoint, status_code, success) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiLog>(&query)
            .bind(&input.api_key_name)
            .bind(&input.ip_address)
            .bind(&input.endpoint)
            .bind(input.status_code)
            .bind(input.success)
            .fetch_one(pool)
            .await
    }

    /// Most recent audit entries, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<ApiLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_logs ORDER BY created_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, ApiLog>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
