//! Repository for the `adventures` table and its lifecycle transitions.
//!
//! Submit, approve, and reject are multi-row operations and always run in a
//! single transaction. Approve serializes the read-then-write sequence per
//! (name, author) with row locks; the partial unique index
//! `uq_adventures_approved_name_author` backstops the "at most one approved"
//! invariant if two approvals for the same pair race anyway.

use sqlx::{PgPool, Postgres, Transaction};

use advstore_core::notifications::{
    approval_message, moderation_message, rejection_message, TYPE_APPROVAL, TYPE_MODERATION,
    TYPE_REJECTION,
};
use advstore_core::roles::{ROLE_ADMIN, ROLE_MODERATOR};
use advstore_core::types::DbId;

use crate::models::adventure::{
    Adventure, AdventureFilter, AdventureSummary, CreateAdventure, PendingAdventure,
    UpdateAdventure, STATUS_APPROVED, STATUS_PENDING, STATUS_SUPERSEDED,
};

/// Column list for `adventures` queries.
const COLUMNS: &str = "id, name, description, author_id, file_path, file_size, \
    game_version, builder_version, downloads, status, thumbnail_path, created_at";

/// Column list for summary queries (joined with users and ratings).
const SUMMARY_COLUMNS: &str = "a.id, a.name, a.description, u.username AS author, \
    a.author_id, a.file_size, a.game_version, a.builder_version, a.downloads, \
    a.status, a.thumbnail_path, a.created_at, \
    COALESCE(AVG(r.rating), 0)::float8 AS avg_rating, \
    COUNT(DISTINCT r.id) AS rating_count";

/// Stored file locations of a removed adventure, for best-effort cleanup
/// after the deleting transaction has committed.
#[derive(Debug, Clone)]
pub struct RemovedAdventure {
    pub id: DbId,
    pub name: String,
    pub author_id: DbId,
    pub file_path: String,
    pub thumbnail_path: Option<String>,
}

/// Provides lifecycle and query operations for adventures.
pub struct AdventureRepo;

impl AdventureRepo {
    /// Create a pending adventure with its tag associations and a moderation
    /// notification per moderator/admin, all in one transaction.
    ///
    /// Tag ids must already be validated; a dangling id aborts the whole
    /// transaction via the foreign key.
    pub async fn create_pending(
        pool: &PgPool,
        input: &CreateAdventure,
    ) -> Result<Adventure, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO adventures \
                (name, description, author_id, file_path, file_size, \
                 game_version, builder_version, status, thumbnail_path) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, {STATUS_PENDING}, $8) \
             RETURNING {COLUMNS}"
        );
        let adventure = sqlx::query_as::<_, Adventure>(&insert_query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.author_id)
            .bind(&input.file_path)
            .bind(input.file_size)
            .bind(&input.game_version)
            .bind(&input.builder_version)
            .bind(&input.thumbnail_path)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_tags_inner(&mut tx, adventure.id, &input.tag_ids).await?;

        let moderator_ids: Vec<(DbId,)> =
            sqlx::query_as("SELECT id FROM users WHERE role IN ($1, $2)")
                .bind(ROLE_ADMIN)
                .bind(ROLE_MODERATOR)
                .fetch_all(&mut *tx)
                .await?;

        let content = moderation_message(&adventure.name);
        for (moderator_id,) in moderator_ids {
            sqlx::query(
                "INSERT INTO notifications (user_id, content, type, related_id) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(moderator_id)
            .bind(&content)
            .bind(TYPE_MODERATION)
            .bind(adventure.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(adventure)
    }

    /// Approve a pending adventure, demoting any approved sibling with the
    /// same (name, author) to superseded, in one transaction.
    ///
    /// Returns `None` when the record is absent or no longer pending.
    pub async fn approve(pool: &PgPool, id: DbId) -> Result<Option<Adventure>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock_query = format!(
            "SELECT {COLUMNS} FROM adventures \
             WHERE id = $1 AND status = {STATUS_PENDING} FOR UPDATE"
        );
        let Some(target) = sqlx::query_as::<_, Adventure>(&lock_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        // Demote the sibling first so the approval below never collides
        // with it on the partial unique index.
        let supersede_query = format!(
            "UPDATE adventures SET status = {STATUS_SUPERSEDED} \
             WHERE status = {STATUS_APPROVED} \
               AND author_id = $1 AND LOWER(name) = LOWER($2) AND id <> $3"
        );
        sqlx::query(&supersede_query)
            .bind(target.author_id)
            .bind(&target.name)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let approve_query = format!(
            "UPDATE adventures SET status = {STATUS_APPROVED} \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let approved = sqlx::query_as::<_, Adventure>(&approve_query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO notifications (user_id, content, type, related_id) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(approved.author_id)
        .bind(approval_message(&approved.name))
        .bind(TYPE_APPROVAL)
        .bind(approved.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(approved))
    }

    /// Reject a pending adventure: delete it and every dependent row, notify
    /// the author, and return the stored file locations for cleanup.
    ///
    /// Returns `None` when the record is absent or already moderated.
    pub async fn reject(pool: &PgPool, id: DbId) -> Result<Option<RemovedAdventure>, sqlx::Error> {
        Self::remove(pool, id, true).await
    }

    /// Unconditional removal usable regardless of current state (admin only).
    pub async fn admin_delete(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RemovedAdventure>, sqlx::Error> {
        Self::remove(pool, id, false).await
    }

    async fn remove(
        pool: &PgPool,
        id: DbId,
        require_pending: bool,
    ) -> Result<Option<RemovedAdventure>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let lock_query = if require_pending {
            format!(
                "SELECT {COLUMNS} FROM adventures \
                 WHERE id = $1 AND status = {STATUS_PENDING} FOR UPDATE"
            )
        } else {
            format!("SELECT {COLUMNS} FROM adventures WHERE id = $1 FOR UPDATE")
        };
        let Some(target) = sqlx::query_as::<_, Adventure>(&lock_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        // Dependent rows first (FK constraints), then the adventure itself.
        sqlx::query("DELETE FROM adventure_tags WHERE adventure_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM ratings WHERE adventure_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM reviews WHERE adventure_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM notifications WHERE related_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM adventures WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // The rejection notification carries no related id: the adventure
        // row it would point at no longer exists.
        sqlx::query(
            "INSERT INTO notifications (user_id, content, type, related_id) \
             VALUES ($1, $2, $3, NULL)",
        )
        .bind(target.author_id)
        .bind(rejection_message(&target.name))
        .bind(TYPE_REJECTION)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(RemovedAdventure {
            id: target.id,
            name: target.name,
            author_id: target.author_id,
            file_path: target.file_path,
            thumbnail_path: target.thumbnail_path,
        }))
    }

    /// Admin metadata edit. Only non-`None` fields are applied; `tag_ids`
    /// replaces all tag associations when present.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAdventure,
    ) -> Result<Option<Adventure>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update_query = format!(
            "UPDATE adventures SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                status = COALESCE($4, status), \
                game_version = COALESCE($5, game_version), \
                builder_version = COALESCE($6, builder_version) \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let Some(adventure) = sqlx::query_as::<_, Adventure>(&update_query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.status)
            .bind(&input.game_version)
            .bind(&input.builder_version)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(tag_ids) = &input.tag_ids {
            sqlx::query("DELETE FROM adventure_tags WHERE adventure_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::set_tags_inner(&mut tx, id, tag_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(adventure))
    }

    /// Swap in a replacement package file and its re-inspected metadata.
    pub async fn replace_package(
        pool: &PgPool,
        id: DbId,
        file_path: &str,
        file_size: i64,
        game_version: &str,
        builder_version: &str,
        thumbnail_path: Option<&str>,
    ) -> Result<Option<Adventure>, sqlx::Error> {
        let query = format!(
            "UPDATE adventures SET \
                file_path = $2, file_size = $3, game_version = $4, \
                builder_version = $5, thumbnail_path = $6 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Adventure>(&query)
            .bind(id)
            .bind(file_path)
            .bind(file_size)
            .bind(game_version)
            .bind(builder_version)
            .bind(thumbnail_path)
            .fetch_optional(pool)
            .await
    }

    /// Find an adventure by its id, regardless of state.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Adventure>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM adventures WHERE id = $1");
        sqlx::query_as::<_, Adventure>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the approved adventure with the given name, case-insensitively.
    pub async fn find_approved_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Adventure>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM adventures \
             WHERE LOWER(name) = LOWER($1) AND status = {STATUS_APPROVED}"
        );
        sqlx::query_as::<_, Adventure>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Find any adventure blocking a name for availability purposes:
    /// pending and approved records only; superseded ones do not block.
    pub async fn find_blocking_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Adventure>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM adventures \
             WHERE LOWER(name) = LOWER($1) \
               AND status IN ({STATUS_PENDING}, {STATUS_APPROVED}) \
             LIMIT 1"
        );
        sqlx::query_as::<_, Adventure>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Public listing of approved adventures with optional tag filter,
    /// name/description search, and sort order.
    pub async fn list_approved(
        pool: &PgPool,
        filter: &AdventureFilter,
    ) -> Result<Vec<AdventureSummary>, sqlx::Error> {
        let mut query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM adventures a \
             JOIN users u ON a.author_id = u.id \
             LEFT JOIN ratings r ON a.id = r.adventure_id"
        );
        if filter.tag.is_some() {
            query.push_str(" JOIN adventure_tags at ON a.id = at.adventure_id");
        }
        query.push_str(&format!(" WHERE a.status = {STATUS_APPROVED}"));
        if filter.tag.is_some() {
            query.push_str(" AND at.tag_id = $1");
        }
        if filter.search.is_some() {
            let n = if filter.tag.is_some() { 2 } else { 1 };
            query.push_str(&format!(
                " AND (a.name ILIKE ${n} OR a.description ILIKE ${n})"
            ));
        }
        query.push_str(" GROUP BY a.id, u.username");
        query.push_str(match filter.sort.as_deref() {
            Some("oldest") => " ORDER BY a.created_at ASC",
            Some("highest_rated") => " ORDER BY avg_rating DESC",
            Some("most_downloaded") => " ORDER BY a.downloads DESC",
            _ => " ORDER BY a.created_at DESC",
        });

        let mut q = sqlx::query_as::<_, AdventureSummary>(&query);
        if let Some(tag_id) = filter.tag {
            q = q.bind(tag_id);
        }
        if let Some(search) = &filter.search {
            q = q.bind(format!("%{search}%"));
        }
        q.fetch_all(pool).await
    }

    /// An author's own adventures in any state, newest first.
    pub async fn list_by_author(
        pool: &PgPool,
        author_id: DbId,
    ) -> Result<Vec<AdventureSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM adventures a \
             JOIN users u ON a.author_id = u.id \
             LEFT JOIN ratings r ON a.id = r.adventure_id \
             WHERE a.author_id = $1 \
             GROUP BY a.id, u.username \
             ORDER BY a.created_at DESC"
        );
        sqlx::query_as::<_, AdventureSummary>(&query)
            .bind(author_id)
            .fetch_all(pool)
            .await
    }

    /// One approved adventure with aggregates, for the detail view.
    pub async fn get_approved_summary(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AdventureSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM adventures a \
             JOIN users u ON a.author_id = u.id \
             LEFT JOIN ratings r ON a.id = r.adventure_id \
             WHERE a.id = $1 AND a.status = {STATUS_APPROVED} \
             GROUP BY a.id, u.username"
        );
        sqlx::query_as::<_, AdventureSummary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The moderation queue: pending adventures oldest first, each with the
    /// game version of the currently approved same-(name, author) record.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<PendingAdventure>, sqlx::Error> {
        let query = format!(
            "SELECT a.id, a.name, a.description, u.username AS author, a.author_id, \
                    a.file_size, a.game_version, a.builder_version, a.created_at, \
                    appr.game_version AS approved_game_version \
             FROM adventures a \
             JOIN users u ON a.author_id = u.id \
             LEFT JOIN adventures appr \
               ON appr.status = {STATUS_APPROVED} \
              AND appr.author_id = a.author_id \
              AND LOWER(appr.name) = LOWER(a.name) \
             WHERE a.status = {STATUS_PENDING} \
             ORDER BY a.created_at ASC"
        );
        sqlx::query_as::<_, PendingAdventure>(&query)
            .fetch_all(pool)
            .await
    }

    /// Atomically bump the download counter of an approved adventure.
    pub async fn increment_downloads(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Adventure>, sqlx::Error> {
        let query = format!(
            "UPDATE adventures SET downloads = downloads + 1 \
             WHERE id = $1 AND status = {STATUS_APPROVED} \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Adventure>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Number of adventures awaiting moderation.
    pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM adventures WHERE status = {STATUS_PENDING}"
        ))
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Approved-adventure count and total downloads, for the dashboard.
    pub async fn approved_totals(pool: &PgPool) -> Result<(i64, i64), sqlx::Error> {
        let (count, downloads): (i64, i64) = sqlx::query_as(&format!(
            "SELECT COUNT(*), COALESCE(SUM(downloads), 0) \
             FROM adventures WHERE status = {STATUS_APPROVED}"
        ))
        .fetch_one(pool)
        .await?;
        Ok((count, downloads))
    }

    async fn set_tags_inner(
        tx: &mut Transaction<'_, Postgres>,
        adventure_id: DbId,
        tag_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        for tag_id in tag_ids {
            sqlx::query(
                "INSERT INTO adventure_tags (adventure_id, tag_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(adventure_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
