//! Handlers for the external API (`/api/v2`, authenticated via `X-API-Key`).
//!
//! Every request outcome, success or failure, lands in the `api_logs`
//! audit table. Submissions are attributed to the key's owner.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use advstore_core::error::CoreError;
use advstore_db::models::adventure::Adventure;
use advstore_db::models::tag::Tag;
use advstore_db::repositories::{AdventureRepo, TagRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::adventures::read_submission;
use crate::middleware::api_key::ApiKeyIdentity;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::submission::submit_package;

/// Query parameters for `GET /api/v2/title-availability`.
#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub name: String,
}

/// Response for the title availability probe.
#[derive(Debug, Serialize)]
pub struct TitleAvailability {
    pub name: String,
    pub available: bool,
}

/// POST /api/v2/submit (multipart)
///
/// Submit a package through the same pipeline as the web UI, including the
/// at-least-one-tag rule.
pub async fn submit(
    identity: ApiKeyIdentity,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Adventure>>)> {
    let result = submit_inner(&identity, &state, multipart).await;
    match &result {
        Ok(_) => identity.log(&state.pool, 201, true).await,
        Err(err) => identity.log(&state.pool, err.status().as_u16(), false).await,
    }
    result
}

async fn submit_inner(
    identity: &ApiKeyIdentity,
    state: &AppState,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Adventure>>)> {
    let owner = UserRepo::find_by_id(&state.pool, identity.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: identity.user_id,
        }))?;

    let request = read_submission(multipart).await?;
    let adventure = submit_package(state, &owner, request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: adventure })))
}

/// GET /api/v2/tags
pub async fn tags(
    identity: ApiKeyIdentity,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Tag>>>> {
    let result = TagRepo::list(&state.pool).await.map_err(AppError::from);
    match &result {
        Ok(_) => identity.log(&state.pool, 200, true).await,
        Err(err) => identity.log(&state.pool, err.status().as_u16(), false).await,
    }
    Ok(Json(DataResponse { data: result? }))
}

/// GET /api/v2/title-availability?name=...
///
/// Whether a name is free to submit: pending and approved records block it,
/// superseded ones do not.
pub async fn title_availability(
    identity: ApiKeyIdentity,
    State(state): State<AppState>,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<DataResponse<TitleAvailability>>> {
    let result = AdventureRepo::find_blocking_by_name(&state.pool, &query.name)
        .await
        .map_err(AppError::from);
    match &result {
        Ok(_) => identity.log(&state.pool, 200, true).await,
        Err(err) => identity.log(&state.pool, err.status().as_u16(), false).await,
    }

    Ok(Json(DataResponse {
        data: TitleAvailability {
            available: result?.is_none(),
            name: query.name,
        },
    }))
}
