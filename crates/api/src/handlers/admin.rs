//! Handlers for the `/admin` surface (admin role required).

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use advstore_core::api_keys::generate_api_key;
use advstore_core::error::CoreError;
use advstore_core::package::{inspect_package, PackageError};
use advstore_core::roles::{ROLE_ADMIN, VALID_ROLES};
use advstore_core::submission::{validate_filename, SubmitError, MAX_UPLOAD_SETTING};
use advstore_core::types::DbId;
use advstore_db::models::adventure::{Adventure, UpdateAdventure};
use advstore_db::models::api_key::{ApiKey, CreateApiKey};
use advstore_db::models::api_log::ApiLog;
use advstore_db::models::setting::SiteSetting;
use advstore_db::models::statistic::DailyStat;
use advstore_db::models::tag::Tag;
use advstore_db::models::user::{CreateUser, User};
use advstore_db::repositories::{
    AdventureRepo, ApiKeyRepo, ApiLogRepo, SettingRepo, StatisticRepo, TagRepo, UserRepo,
};

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of audit log entries returned by the api-logs endpoint.
const API_LOG_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Admin dashboard payload: headline counts plus usage counters.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub total_users: i64,
    pub approved_adventures: i64,
    pub pending_adventures: i64,
    pub total_downloads: i64,
    pub today: Vec<DailyStat>,
    pub totals: Vec<DailyStat>,
}

/// GET /api/v1/admin/dashboard
pub async fn dashboard(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Dashboard>>> {
    let total_users = UserRepo::count(&state.pool).await?;
    let (approved_adventures, total_downloads) =
        AdventureRepo::approved_totals(&state.pool).await?;
    let pending_adventures = AdventureRepo::count_pending(&state.pool).await?;
    let today = StatisticRepo::for_date(&state.pool, chrono::Utc::now().date_naive()).await?;
    let totals = StatisticRepo::totals(&state.pool).await?;

    Ok(Json(DataResponse {
        data: Dashboard {
            total_users,
            approved_adventures,
            pending_adventures,
            total_downloads,
            today,
            totals,
        },
    }))
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// POST /api/v1/admin/users
///
/// Create an account directly with any valid role.
pub async fn create_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    let username = input.username.trim();
    if username.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username must not be empty".into(),
        )));
    }
    if !input.email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email address is required".into(),
        )));
    }
    if !VALID_ROLES.contains(&input.role.as_str()) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid role '{}'",
            input.role
        ))));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|err| AppError::InternalError(format!("Password hashing failed: {err}")))?;

    // Duplicate username/email surfaces as 23505 on uq_users_* -> 409.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.to_string(),
            email: input.email.trim().to_string(),
            password_hash,
            role: input.role.clone(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User created by admin");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// Demoting the last remaining admin is refused.
pub async fn update_user_role(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<DataResponse<User>>> {
    if !VALID_ROLES.contains(&input.role.as_str()) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid role '{}'",
            input.role
        ))));
    }

    let target = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "user", id }))?;

    if target.role == ROLE_ADMIN
        && input.role != ROLE_ADMIN
        && UserRepo::count_admins(&state.pool).await? <= 1
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Cannot demote the last remaining admin".into(),
        )));
    }

    let updated = UserRepo::update_role(&state.pool, id, &input.role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "user", id }))?;
    tracing::info!(user_id = id, role = %updated.role, "User role updated");
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Site settings
// ---------------------------------------------------------------------------

/// Request body for `PUT /admin/settings`.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub setting_name: String,
    pub setting_value: String,
}

/// GET /api/v1/admin/settings
pub async fn list_settings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SiteSetting>>>> {
    let settings = SettingRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/admin/settings
pub async fn update_setting(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<UpdateSettingRequest>,
) -> AppResult<Json<DataResponse<SiteSetting>>> {
    if input.setting_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Setting name must not be empty".into(),
        )));
    }
    // The upload ceiling must stay a positive number of megabytes.
    if input.setting_name == MAX_UPLOAD_SETTING
        && input.setting_value.parse::<u64>().map_or(true, |v| v == 0)
    {
        return Err(AppError::Core(CoreError::Validation(
            "max_upload_size must be a positive integer (MB)".into(),
        )));
    }

    let setting =
        SettingRepo::set(&state.pool, input.setting_name.trim(), &input.setting_value).await?;
    tracing::info!(name = %setting.setting_name, value = %setting.setting_value, "Site setting updated");
    Ok(Json(DataResponse { data: setting }))
}

// ---------------------------------------------------------------------------
// Tag management
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/tags`.
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
}

/// POST /api/v1/admin/tags
pub async fn create_tag(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTagRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Tag>>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Tag name must not be empty".into(),
        )));
    }
    // Duplicates surface as 23505 on uq_tags_name -> 409.
    let tag = TagRepo::create(&state.pool, name).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: tag })))
}

/// DELETE /api/v1/admin/tags/{id}
pub async fn delete_tag(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TagRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "tag", id }));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Adventure management
// ---------------------------------------------------------------------------

/// Request body for `PUT /admin/adventures/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateAdventureRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<i16>,
    pub game_version: Option<String>,
    pub builder_version: Option<String>,
    pub tag_ids: Option<Vec<DbId>>,
}

/// PUT /api/v1/admin/adventures/{id}
pub async fn update_adventure(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAdventureRequest>,
) -> AppResult<Json<DataResponse<Adventure>>> {
    if let Some(status) = input.status {
        if !(0..=2).contains(&status) {
            return Err(AppError::Core(CoreError::Validation(
                "Status must be 0 (pending), 1 (approved) or 2 (superseded)".into(),
            )));
        }
    }
    if let Some(tag_ids) = &input.tag_ids {
        let existing = TagRepo::count_existing(&state.pool, tag_ids).await?;
        if existing != tag_ids.len() as i64 {
            return Err(AppError::Core(CoreError::Validation(
                "One or more tag ids do not exist".into(),
            )));
        }
    }

    let update = UpdateAdventure {
        name: input.name,
        description: input.description,
        status: input.status,
        game_version: input.game_version,
        builder_version: input.builder_version,
        tag_ids: input.tag_ids,
    };
    let adventure = AdventureRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "adventure",
            id,
        }))?;
    Ok(Json(DataResponse { data: adventure }))
}

/// POST /api/v1/admin/adventures/{id}/package (multipart)
///
/// Replace the stored package archive. The new archive is inspected the
/// same way a submission is and the adventure row takes its versions and
/// thumbnail. An archive without a metadata descriptor is still accepted:
/// the versions fall back to the `game_version` / `builder_version` form
/// fields, or to the current row values. Old files are removed once the
/// row points at the new ones.
pub async fn replace_package(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<Adventure>>> {
    let existing = AdventureRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "adventure",
            id,
        }))?;

    let mut filename = None;
    let mut bytes = None;
    let mut form_game_version = None;
    let mut form_builder_version = None;
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
            Some("game_version") => form_game_version = field.text().await.ok(),
            Some("builder_version") => form_builder_version = field.text().await.ok(),
            _ => {}
        }
    }
    let bytes = bytes.ok_or_else(|| AppError::BadRequest("Missing file field".into()))?;
    let filename = filename.ok_or_else(|| AppError::BadRequest("Missing filename".into()))?;

    validate_filename(&filename).map_err(AppError::Submit)?;
    let metadata = match inspect_package(&bytes) {
        Ok(metadata) => Some(metadata),
        Err(PackageError::MissingMetadata) => None,
        Err(err) => {
            return Err(AppError::Submit(SubmitError::Package(err)));
        }
    };
    let game_version = metadata
        .as_ref()
        .map(|m| m.game_version.clone())
        .or(form_game_version)
        .unwrap_or_else(|| existing.game_version.clone());
    let builder_version = metadata
        .as_ref()
        .map(|m| m.builder_version.clone())
        .or(form_builder_version)
        .unwrap_or_else(|| existing.builder_version.clone());

    let admin_user = UserRepo::find_by_id(&state.pool, admin.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: admin.user_id,
        }))?;

    let stored = state
        .store
        .save_package(&admin_user.username, &filename, &bytes)
        .await
        .map_err(|err| AppError::InternalError(format!("Failed to store package: {err}")))?;

    let mut thumbnail_path = None;
    if let Some(thumbnail) = metadata.as_ref().and_then(|m| m.thumbnail.as_ref()) {
        if let Ok(file) = state
            .store
            .save_thumbnail(&admin_user.username, &thumbnail.extension, &thumbnail.bytes)
            .await
        {
            thumbnail_path = Some(file.relative_path);
        }
    }

    let updated = match AdventureRepo::replace_package(
        &state.pool,
        id,
        &stored.relative_path,
        stored.size as i64,
        &game_version,
        &builder_version,
        thumbnail_path.as_deref(),
    )
    .await
    {
        Ok(Some(adventure)) => adventure,
        Ok(None) => {
            state.store.remove(&stored.relative_path).await;
            return Err(AppError::Core(CoreError::NotFound {
                entity: "adventure",
                id,
            }));
        }
        Err(err) => {
            state.store.remove(&stored.relative_path).await;
            if let Some(path) = &thumbnail_path {
                state.store.remove(path).await;
            }
            return Err(err.into());
        }
    };

    // Old files only go once the row points at the new ones.
    state.store.remove(&existing.file_path).await;
    if let Some(old_thumbnail) = &existing.thumbnail_path {
        state.store.remove(old_thumbnail).await;
    }

    tracing::info!(adventure_id = id, "Package replaced");
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/admin/adventures/{id}
///
/// Unconditional removal, regardless of lifecycle state.
pub async fn delete_adventure(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let removed = AdventureRepo::admin_delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "adventure",
            id,
        }))?;

    state.store.remove(&removed.file_path).await;
    if let Some(thumbnail) = &removed.thumbnail_path {
        state.store.remove(thumbnail).await;
    }

    tracing::info!(adventure_id = id, name = %removed.name, "Adventure deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// API keys and audit log
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/api-keys`.
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
    /// Owner of the key; external submissions are attributed to this user.
    pub user_id: DbId,
}

/// Response for key creation. The plaintext key appears exactly once, here.
#[derive(Debug, Serialize)]
pub struct CreatedApiKey {
    #[serde(flatten)]
    pub key: ApiKey,
    pub plaintext: String,
}

/// GET /api/v1/admin/api-keys
pub async fn list_api_keys(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ApiKey>>>> {
    let keys = ApiKeyRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: keys }))
}

/// POST /api/v1/admin/api-keys
pub async fn create_api_key(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateApiKeyRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedApiKey>>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "API key name must not be empty".into(),
        )));
    }
    let owner = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: input.user_id,
        }))?;

    let generated = generate_api_key();
    let key = ApiKeyRepo::create(
        &state.pool,
        &CreateApiKey {
            user_id: owner.id,
            name: name.to_string(),
            key_hash: generated.hash,
            key_prefix: generated.prefix,
        },
    )
    .await?;

    tracing::info!(key_id = key.id, name = %key.name, owner = %owner.username, "API key created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedApiKey {
                key,
                plaintext: generated.plaintext,
            },
        }),
    ))
}

/// POST /api/v1/admin/api-keys/{id}/revoke
pub async fn revoke_api_key(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ApiKey>>> {
    let key = ApiKeyRepo::set_active(&state.pool, id, false)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "api key",
            id,
        }))?;
    tracing::info!(key_id = id, name = %key.name, "API key revoked");
    Ok(Json(DataResponse { data: key }))
}

/// DELETE /api/v1/admin/api-keys/{id}
pub async fn delete_api_key(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ApiKeyRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "api key",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/api-logs
pub async fn list_api_logs(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ApiLog>>>> {
    let logs = ApiLogRepo::list_recent(&state.pool, API_LOG_LIMIT).await?;
    Ok(Json(DataResponse { data: logs }))
}
