//! Repository for site settings.

use sqlx::PgPool;

use advstore_core::submission::{DEFAULT_MAX_UPLOAD_MB, MAX_UPLOAD_SETTING};

use crate::models::setting::SiteSetting;

const COLUMNS: &str = "id, setting_name, setting_value";

/// Provides keyed access to site settings.
pub struct SettingRepo;

impl SettingRepo {
    pub async fn get(pool: &PgPool, name: &str) -> Result<Option<SiteSetting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_settings WHERE setting_name = $1");
        sqlx::query_as::<_, SiteSetting>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<SiteSetting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM site_settings ORDER BY setting_name ASC");
        sqlx::query_as::<_, SiteSetting>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn set(pool: &PgPool, name: &str, value: &str) -> Result<SiteSetting, sqlx::Error> {
        let query = format!(
            "INSERT INTO site_settings (setting_name, setting_value) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_site_settings_name \
             DO UPDATE SET setting_value = EXCLUDED.setting_value \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SiteSetting>(&query)
            .bind(name)
            .bind(value)
            .fetch_one(pool)
            .await
    }

    /// The configured upload limit in megabytes, falling back to the default
    /// when the setting is missing or not a number.
    pub async fn max_upload_mb(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let setting = Self::get(pool, MAX_UPLOAD_SETTING).await?;
        Ok(setting
            .and_then(|s| s.setting_value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB))
    }
}
