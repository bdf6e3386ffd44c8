//! Repository for daily usage counters.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::statistic::DailyStat;

/// Increments and reads per-day statistics rows.
pub struct StatisticRepo;

impl StatisticRepo {
    /// Add `amount` to today's row for `stat_name`, creating it at zero first
    /// if needed. The unique (stat_name, stat_date) index makes this a
    /// straightforward upsert.
    pub async fn increment(
        pool: &PgPool,
        stat_name: &str,
        amount: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO statistics (stat_name, stat_date, stat_value) \
             VALUES ($1, CURRENT_DATE, $2) \
             ON CONFLICT ON CONSTRAINT uq_statistics_name_date \
             DO UPDATE SET stat_value = statistics.stat_value + EXCLUDED.stat_value",
        )
        .bind(stat_name)
        .bind(amount)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// All counters for one day.
    pub async fn for_date(pool: &PgPool, date: NaiveDate) -> Result<Vec<DailyStat>, sqlx::Error> {
        sqlx::query_as::<_, DailyStat>(
            "SELECT stat_name, stat_value FROM statistics WHERE stat_date = $1",
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }

    /// All-time totals per counter.
    pub async fn totals(pool: &PgPool) -> Result<Vec<DailyStat>, sqlx::Error> {
        sqlx::query_as::<_, DailyStat>(
            "SELECT stat_name, SUM(stat_value)::bigint AS stat_value \
             FROM statistics GROUP BY stat_name",
        )
        .fetch_all(pool)
        .await
    }
}
