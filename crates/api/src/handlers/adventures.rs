//! Handlers for the public catalogue and authenticated community actions
//! (submission, downloads, ratings, reviews).

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use advstore_core::error::CoreError;
use advstore_core::stats::STAT_DOWNLOADS;
use advstore_core::types::DbId;
use advstore_db::models::adventure::{Adventure, AdventureFilter, AdventureSummary};
use advstore_db::models::review::ReviewWithAuthor;
use advstore_db::models::tag::Tag;
use advstore_db::repositories::{
    AdventureRepo, RatingRepo, ReviewRepo, StatisticRepo, TagRepo, UserRepo,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::submission::{submit_package, SubmissionRequest};

/// Longest accepted review body.
const REVIEW_MAX_CHARS: usize = 4000;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /adventures`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub tag: Option<DbId>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

/// Full detail payload for one approved adventure.
#[derive(Debug, Serialize)]
pub struct AdventureDetail {
    #[serde(flatten)]
    pub summary: AdventureSummary,
    pub tags: Vec<Tag>,
    pub reviews: Vec<ReviewWithAuthor>,
}

/// Request body for `POST /adventures/{id}/rate`.
#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: i32,
}

/// Aggregate returned after rating.
#[derive(Debug, Serialize)]
pub struct RatingSummary {
    pub avg_rating: f64,
    pub rating_count: i64,
}

/// Request body for `POST /adventures/{id}/reviews`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub content: String,
}

// ---------------------------------------------------------------------------
// Public catalogue
// ---------------------------------------------------------------------------

/// GET /api/v1/adventures
///
/// Approved adventures with optional tag filter, search, and sort order.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<AdventureSummary>>>> {
    let filter = AdventureFilter {
        tag: query.tag,
        search: query.search,
        sort: query.sort,
    };
    let adventures = AdventureRepo::list_approved(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: adventures }))
}

/// GET /api/v1/adventures/{id}
///
/// Detail view of one approved adventure, with tags and reviews.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AdventureDetail>>> {
    let summary = AdventureRepo::get_approved_summary(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "adventure",
            id,
        }))?;
    let tags = TagRepo::list_for_adventure(&state.pool, id).await?;
    let reviews = ReviewRepo::list_for_adventure(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: AdventureDetail {
            summary,
            tags,
            reviews,
        },
    }))
}

/// GET /api/v1/adventures/{id}/download
///
/// Stream the package archive and bump the download counters.
pub async fn download(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    let adventure = AdventureRepo::increment_downloads(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "adventure",
            id,
        }))?;

    let bytes = state.store.read(&adventure.file_path).await.map_err(|err| {
        tracing::error!(error = %err, adventure_id = id, path = %adventure.file_path,
            "Stored package file missing or unreadable");
        AppError::InternalError("Package file unavailable".into())
    })?;

    if let Err(err) = StatisticRepo::increment(&state.pool, STAT_DOWNLOADS, 1).await {
        tracing::warn!(error = %err, "Failed to record download statistic");
    }

    let filename = format!("{}.zip", adventure.name.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// POST /api/v1/adventures (multipart)
///
/// Submit a package for moderation. Fields: `file` (required), `description`
/// (optional), `tags` (comma-separated tag ids, at least one required).
pub async fn submit(
    user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Adventure>>)> {
    let author = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: user.user_id,
        }))?;

    let request = read_submission(multipart).await?;
    let adventure = submit_package(&state, &author, request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: adventure })))
}

/// GET /api/v1/my/adventures
///
/// The authenticated user's own adventures in every state.
pub async fn my_adventures(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AdventureSummary>>>> {
    let adventures = AdventureRepo::list_by_author(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: adventures }))
}

// ---------------------------------------------------------------------------
// Ratings and reviews
// ---------------------------------------------------------------------------

/// POST /api/v1/adventures/{id}/rate
///
/// Set (or replace) the caller's 1-5 star rating.
pub async fn rate(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RateRequest>,
) -> AppResult<Json<DataResponse<RatingSummary>>> {
    if !(1..=5).contains(&input.rating) {
        return Err(AppError::Core(CoreError::Validation(
            "Rating must be between 1 and 5".into(),
        )));
    }

    require_approved(&state, id).await?;
    RatingRepo::upsert(&state.pool, id, user.user_id, input.rating).await?;
    let (avg_rating, rating_count) = RatingRepo::aggregate(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: RatingSummary {
            avg_rating,
            rating_count,
        },
    }))
}

/// POST /api/v1/adventures/{id}/reviews
pub async fn create_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ReviewWithAuthor>>)> {
    let content = input.content.trim();
    if content.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Review content must not be empty".into(),
        )));
    }
    if content.chars().count() > REVIEW_MAX_CHARS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Review content must not exceed {REVIEW_MAX_CHARS} characters"
        ))));
    }

    require_approved(&state, id).await?;
    let review = ReviewRepo::create(&state.pool, id, user.user_id, content).await?;
    let reviews = ReviewRepo::list_for_adventure(&state.pool, id).await?;
    let created = reviews
        .into_iter()
        .find(|r| r.id == review.id)
        .ok_or_else(|| AppError::InternalError("Created review not found".into()))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn require_approved(state: &AppState, id: DbId) -> AppResult<()> {
    AdventureRepo::get_approved_summary(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "adventure",
            id,
        }))
}

/// Read a submission out of a multipart body.
pub async fn read_submission(mut multipart: Multipart) -> AppResult<SubmissionRequest> {
    let mut filename = None;
    let mut bytes = None;
    let mut description = None;
    let mut tag_ids = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("Invalid multipart body: {err}")))?
    {
        match field.name() {
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|err| {
                            AppError::BadRequest(format!("Failed to read file field: {err}"))
                        })?
                        .to_vec(),
                );
            }
            Some("description") => {
                let text = field.text().await.map_err(|err| {
                    AppError::BadRequest(format!("Failed to read description field: {err}"))
                })?;
                if !text.trim().is_empty() {
                    description = Some(text.trim().to_string());
                }
            }
            Some("tags") => {
                let text = field.text().await.map_err(|err| {
                    AppError::BadRequest(format!("Failed to read tags field: {err}"))
                })?;
                for part in text.split(',') {
                    let part = part.trim();
                    if part.is_empty() {
                        continue;
                    }
                    let id: DbId = part.parse().map_err(|_| {
                        AppError::BadRequest(format!("Invalid tag id: {part}"))
                    })?;
                    tag_ids.push(id);
                }
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| AppError::BadRequest("Missing file field".into()))?;
    let filename = filename.ok_or_else(|| AppError::BadRequest("Missing filename".into()))?;

    Ok(SubmissionRequest {
        filename,
        bytes,
        description,
        tag_ids,
    })
}
