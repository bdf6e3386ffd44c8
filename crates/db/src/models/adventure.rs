//! Adventure models: the lifecycle-bearing row plus the enriched read shapes
//! used by the public listing and the moderation queue.

use advstore_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Awaiting moderation.
pub const STATUS_PENDING: i16 = 0;
/// Publicly visible; at most one per (name, author).
pub const STATUS_APPROVED: i16 = 1;
/// Demoted by a newer approval of the same (name, author).
pub const STATUS_SUPERSEDED: i16 = 2;

/// A row from the `adventures` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Adventure {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub author_id: DbId,
    pub file_path: String,
    pub file_size: i64,
    pub game_version: String,
    pub builder_version: String,
    pub downloads: i64,
    pub status: i16,
    pub thumbnail_path: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new pending adventure.
#[derive(Debug, Clone)]
pub struct CreateAdventure {
    pub name: String,
    pub description: String,
    pub author_id: DbId,
    pub file_path: String,
    pub file_size: i64,
    pub game_version: String,
    pub builder_version: String,
    pub thumbnail_path: Option<String>,
    pub tag_ids: Vec<DbId>,
}

/// Listing shape: adventure plus author name and rating aggregates.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdventureSummary {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub author: String,
    pub author_id: DbId,
    pub file_size: i64,
    pub game_version: String,
    pub builder_version: String,
    pub downloads: i64,
    pub status: i16,
    pub thumbnail_path: Option<String>,
    pub created_at: Timestamp,
    pub avg_rating: f64,
    pub rating_count: i64,
}

/// Moderation-queue shape: pending adventure plus the game version of the
/// currently approved record for the same (name, author), if any. The
/// handler derives a non-blocking version warning from it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingAdventure {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub author: String,
    pub author_id: DbId,
    pub file_size: i64,
    pub game_version: String,
    pub builder_version: String,
    pub created_at: Timestamp,
    pub approved_game_version: Option<String>,
}

/// Fields an admin may mutate directly. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAdventure {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<i16>,
    pub game_version: Option<String>,
    pub builder_version: Option<String>,
    pub tag_ids: Option<Vec<DbId>>,
}

/// Filters for the public adventure listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdventureFilter {
    pub tag: Option<DbId>,
    pub search: Option<String>,
    pub sort: Option<String>,
}
