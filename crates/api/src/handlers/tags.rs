//! Handlers for the public tag catalogue.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use advstore_db::models::tag::{PopularTag, Tag};
use advstore_db::repositories::TagRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default number of entries returned by the popular-tags endpoint.
const DEFAULT_POPULAR_LIMIT: i64 = 10;

/// Query parameters for `GET /tags/popular`.
#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/tags
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Tag>>>> {
    let tags = TagRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// GET /api/v1/tags/popular
///
/// Tags ranked by approved-adventure count.
pub async fn popular(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> AppResult<Json<DataResponse<Vec<PopularTag>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_POPULAR_LIMIT).clamp(1, 100);
    let tags = TagRepo::list_popular(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: tags }))
}
