//! Site setting models.

use advstore_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `site_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SiteSetting {
    pub id: DbId,
    pub setting_name: String,
    pub setting_value: String,
}
