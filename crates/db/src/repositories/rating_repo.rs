//! Repository for star ratings.

use sqlx::PgPool;

use advstore_core::types::DbId;

use crate::models::rating::Rating;

const COLUMNS: &str = "id, adventure_id, user_id, rating, created_at";

/// Provides rating upsert and aggregate queries.
pub struct RatingRepo;

impl RatingRepo {
    /// Set a user's rating for an adventure, replacing any previous one.
    pub async fn upsert(
        pool: &PgPool,
        adventure_id: DbId,
        user_id: DbId,
        rating: i32,
    ) -> Result<Rating, sqlx::Error> {
        let query = format!(
            "INSERT INTO ratings (adventure_id, user_id, rating) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_ratings_adventure_user \
             DO UPDATE SET rating = EXCLUDED.rating \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(adventure_id)
            .bind(user_id)
            .bind(rating)
            .fetch_one(pool)
            .await
    }

    /// Average rating and vote count for one adventure.
    pub async fn aggregate(
        pool: &PgPool,
        adventure_id: DbId,
    ) -> Result<(f64, i64), sqlx::Error> {
        let (avg, count): (f64, i64) = sqlx::query_as(
            "SELECT COALESCE(AVG(rating), 0)::float8, COUNT(*) \
             FROM ratings WHERE adventure_id = $1",
        )
        .bind(adventure_id)
        .fetch_one(pool)
        .await?;
        Ok((avg, count))
    }
}
