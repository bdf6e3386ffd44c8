//! Handlers for the authenticated user's notifications.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use advstore_db::models::notification::Notification;
use advstore_db::repositories::NotificationRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Notification list payload with the unread counter the UI badges on.
#[derive(Debug, Serialize)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

/// GET /api/v1/notifications
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<NotificationList>>> {
    let notifications = NotificationRepo::list_for_user(&state.pool, user.user_id).await?;
    let unread_count = NotificationRepo::count_unread(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: NotificationList {
            notifications,
            unread_count,
        },
    }))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let updated = NotificationRepo::mark_all_read(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: serde_json::json!({ "marked_read": updated }),
    }))
}
