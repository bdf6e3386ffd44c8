//! Handlers for the moderation queue (moderator/admin only).

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use advstore_core::error::CoreError;
use advstore_core::types::DbId;
use advstore_core::version::is_strictly_greater;
use advstore_db::models::adventure::{Adventure, PendingAdventure};
use advstore_db::repositories::{AdventureRepo, NotificationRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireModerator;
use crate::response::DataResponse;
use crate::state::AppState;

/// One moderation queue entry.
#[derive(Debug, Serialize)]
pub struct PendingView {
    #[serde(flatten)]
    pub pending: PendingAdventure,
    /// Set when an approved version of the same adventure exists and the
    /// submitted version does not compare strictly higher (or either
    /// version string fails to parse). Approval is still allowed; the
    /// flag only warns the moderator.
    pub version_warning: bool,
}

/// GET /api/v1/moderation/pending
///
/// Pending adventures, oldest first. Viewing the queue marks the caller's
/// unread moderation notifications as read.
pub async fn list_pending(
    RequireModerator(user): RequireModerator,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PendingView>>>> {
    let pending = AdventureRepo::list_pending(&state.pool).await?;

    if let Err(err) = NotificationRepo::mark_moderation_read(&state.pool, user.user_id).await {
        tracing::warn!(error = %err, "Failed to mark moderation notifications read");
    }

    let data = pending
        .into_iter()
        .map(|p| {
            let version_warning = match &p.approved_game_version {
                Some(current) => !matches!(
                    is_strictly_greater(&p.game_version, current),
                    Ok(true)
                ),
                None => false,
            };
            PendingView {
                pending: p,
                version_warning,
            }
        })
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/moderation/{id}/approve
pub async fn approve(
    RequireModerator(user): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Adventure>>> {
    let adventure = AdventureRepo::approve(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "pending adventure",
            id,
        }))?;

    tracing::info!(
        adventure_id = id,
        name = %adventure.name,
        moderator_id = user.user_id,
        "Adventure approved"
    );
    Ok(Json(DataResponse { data: adventure }))
}

/// POST /api/v1/moderation/{id}/reject
///
/// Rejection deletes the record and its package files.
pub async fn reject(
    RequireModerator(user): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let removed = AdventureRepo::reject(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "pending adventure",
            id,
        }))?;

    // Files go after the commit; the database never points at a path that
    // was already deleted.
    state.store.remove(&removed.file_path).await;
    if let Some(thumbnail) = &removed.thumbnail_path {
        state.store.remove(thumbnail).await;
    }

    tracing::info!(
        adventure_id = id,
        name = %removed.name,
        moderator_id = user.user_id,
        "Adventure rejected and removed"
    );
    Ok(Json(DataResponse {
        data: serde_json::json!({ "rejected": removed.name }),
    }))
}
