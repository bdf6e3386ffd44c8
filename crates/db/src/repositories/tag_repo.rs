//! Repository for tags and tag popularity queries.

use sqlx::PgPool;

use advstore_core::types::DbId;

use crate::models::adventure::STATUS_APPROVED;
use crate::models::tag::{PopularTag, Tag};

const COLUMNS: &str = "id, name";

/// Provides read and admin CRUD operations for tags.
pub struct TagRepo;

impl TagRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags ORDER BY name ASC");
        sqlx::query_as::<_, Tag>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags WHERE id = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, name: &str) -> Result<Tag, sqlx::Error> {
        let query = format!("INSERT INTO tags (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Delete a tag and its adventure associations.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM adventure_tags WHERE tag_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// How many of the requested tag ids actually exist.
    pub async fn count_existing(pool: &PgPool, tag_ids: &[DbId]) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tags WHERE id = ANY($1)")
                .bind(tag_ids)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Tags ordered by how many approved adventures carry them.
    pub async fn list_popular(pool: &PgPool, limit: i64) -> Result<Vec<PopularTag>, sqlx::Error> {
        let query = format!(
            "SELECT t.id, t.name, COUNT(a.id) AS adventure_count \
             FROM tags t \
             JOIN adventure_tags at ON t.id = at.tag_id \
             JOIN adventures a ON at.adventure_id = a.id AND a.status = {STATUS_APPROVED} \
             GROUP BY t.id \
             ORDER BY adventure_count DESC, t.name ASC \
             LIMIT $1"
        );
        sqlx::query_as::<_, PopularTag>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Tags attached to one adventure, alphabetically.
    pub async fn list_for_adventure(
        pool: &PgPool,
        adventure_id: DbId,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!(
            "SELECT t.id, t.name FROM tags t \
             JOIN adventure_tags at ON t.id = at.tag_id \
             WHERE at.adventure_id = $1 ORDER BY t.name ASC"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(adventure_id)
            .fetch_all(pool)
            .await
    }
}
