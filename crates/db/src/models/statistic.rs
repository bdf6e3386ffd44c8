//! Daily statistic models.

use serde::Serialize;
use sqlx::FromRow;

/// A per-day counter value, as reported by the admin dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyStat {
    pub stat_name: String,
    pub stat_value: i64,
}
