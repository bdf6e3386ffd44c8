//! `X-API-Key` authentication extractor for the external API.
//!
//! Every authentication attempt is written to `api_logs`, including failed
//! ones (recorded under the name `Invalid Key`). Audit inserts are
//! best-effort: a logging failure never blocks the request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sqlx::PgPool;

use advstore_core::api_keys::hash_api_key;
use advstore_core::error::CoreError;
use advstore_core::types::DbId;
use advstore_db::models::api_log::CreateApiLog;
use advstore_db::repositories::{ApiKeyRepo, ApiLogRepo};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the external API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Name recorded in the audit log for unauthenticated attempts.
pub const INVALID_KEY_NAME: &str = "Invalid Key";

/// Authenticated external API caller.
#[derive(Debug, Clone)]
pub struct ApiKeyIdentity {
    /// Owner of the key; external submissions are attributed to this user.
    pub user_id: DbId,
    /// Display name of the key, recorded in the audit log.
    pub key_name: String,
    /// Client address, from `X-Forwarded-For` when present.
    pub ip_address: Option<String>,
    /// Request path, recorded in the audit log.
    pub endpoint: String,
}

impl ApiKeyIdentity {
    /// Record the outcome of a handled external API request.
    pub async fn log(&self, pool: &PgPool, status_code: u16, success: bool) {
        audit(
            pool,
            Some(self.key_name.clone()),
            self.ip_address.clone(),
            &self.endpoint,
            status_code,
            success,
        )
        .await;
    }
}

impl FromRequestParts<AppState> for ApiKeyIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip_address = client_ip(parts);
        let endpoint = parts.uri.path().to_string();

        let Some(presented) = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        else {
            audit(
                &state.pool,
                None,
                ip_address,
                &endpoint,
                401,
                false,
            )
            .await;
            return Err(AppError::Core(CoreError::Unauthorized(
                "Missing X-API-Key header".into(),
            )));
        };

        let key = ApiKeyRepo::find_active_by_hash(&state.pool, &hash_api_key(presented)).await?;
        let Some(key) = key else {
            audit(
                &state.pool,
                Some(INVALID_KEY_NAME.to_string()),
                ip_address,
                &endpoint,
                401,
                false,
            )
            .await;
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid API key".into(),
            )));
        };

        Ok(ApiKeyIdentity {
            user_id: key.user_id,
            key_name: key.name,
            ip_address,
            endpoint,
        })
    }
}

fn client_ip(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn audit(
    pool: &PgPool,
    api_key_name: Option<String>,
    ip_address: Option<String>,
    endpoint: &str,
    status_code: u16,
    success: bool,
) {
    let entry = CreateApiLog {
        api_key_name,
        ip_address,
        endpoint: endpoint.to_string(),
        status_code: i32::from(status_code),
        success,
    };
    if let Err(err) = ApiLogRepo::insert(pool, &entry).await {
        tracing::warn!(error = %err, endpoint, "Failed to write API audit log entry");
    }
}
