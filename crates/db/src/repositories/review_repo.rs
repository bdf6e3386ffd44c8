//! Repository for written reviews.

use sqlx::PgPool;

use advstore_core::types::DbId;

use crate::models::review::{Review, ReviewWithAuthor};

const COLUMNS: &str = "id, adventure_id, user_id, content, created_at";

/// Provides review creation and listing.
pub struct ReviewRepo;

impl ReviewRepo {
    pub async fn create(
        pool: &PgPool,
        adventure_id: DbId,
        user_id: DbId,
        content: &str,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (adventure_id, user_id, content) \
             VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(adventure_id)
            .bind(user_id)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// Reviews for one adventure with author names, newest first.
    pub async fn list_for_adventure(
        pool: &PgPool,
        adventure_id: DbId,
    ) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.id, r.user_id, u.username, r.content, r.created_at \
             FROM reviews r \
             JOIN users u ON r.user_id = u.id \
             WHERE r.adventure_id = $1 \
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(adventure_id)
        .fetch_all(pool)
        .await
    }
}
