//! External-API audit log models.

use advstore_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `api_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiLog {
    pub id: DbId,
    pub api_key_name: Option<String>,
    pub ip_address: Option<String>,
    pub endpoint: String,
    pub status_code: i32,
    pub success: bool,
    pub created_at: Timestamp,
}

/// DTO for appending an audit row.
#[derive(Debug, Clone)]
pub struct CreateApiLog {
    pub api_key_name: Option<String>,
    pub ip_address: Option<String>,
    pub endpoint: String,
    pub status_code: i32,
    pub success: bool,
}
