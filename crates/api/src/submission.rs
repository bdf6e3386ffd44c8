//! The submission pipeline shared by the web UI endpoint and the external
//! API endpoint.
//!
//! Order of checks: filename, size ceiling, tag existence, archive
//! inspection, then the name/version rules against currently pending and
//! approved records. Files touch disk only after every check has passed,
//! and are removed again if the database insert fails.

use advstore_core::package::inspect_package;
use advstore_core::stats::STAT_UPLOADS;
use advstore_core::submission::{
    validate_filename, validate_size, validate_tag_selection, SubmitError,
};
use advstore_core::types::DbId;
use advstore_core::version::is_strictly_greater;
use advstore_db::models::adventure::{Adventure, CreateAdventure, STATUS_PENDING};
use advstore_db::models::user::User;
use advstore_db::repositories::{AdventureRepo, SettingRepo, StatisticRepo, TagRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// An upload about to enter the pipeline.
#[derive(Debug)]
pub struct SubmissionRequest {
    /// Original filename as presented by the client.
    pub filename: String,
    /// Raw archive bytes.
    pub bytes: Vec<u8>,
    /// Fallback description for archives whose descriptor omits one.
    pub description: Option<String>,
    /// Tag ids to attach. At least one is required.
    pub tag_ids: Vec<DbId>,
}

/// Run the full submission pipeline and return the created pending adventure.
pub async fn submit_package(
    state: &AppState,
    author: &User,
    request: SubmissionRequest,
) -> AppResult<Adventure> {
    validate_filename(&request.filename).map_err(AppError::Submit)?;

    let max_mb = SettingRepo::max_upload_mb(&state.pool).await?;
    validate_size(request.bytes.len() as u64, max_mb).map_err(AppError::Submit)?;

    validate_tag_selection(&request.tag_ids).map_err(AppError::Submit)?;
    let mut tag_ids = request.tag_ids.clone();
    tag_ids.sort_unstable();
    tag_ids.dedup();
    let existing = TagRepo::count_existing(&state.pool, &tag_ids).await?;
    if existing != tag_ids.len() as i64 {
        return Err(AppError::Submit(SubmitError::InvalidTags));
    }

    let metadata = inspect_package(&request.bytes).map_err(SubmitError::Package)?;

    check_name_and_version(state, author, &metadata.name, &metadata.game_version).await?;

    let stored = state
        .store
        .save_package(&author.username, &request.filename, &request.bytes)
        .await
        .map_err(|err| AppError::InternalError(format!("Failed to store package: {err}")))?;

    let mut thumbnail_path = None;
    if let Some(thumbnail) = &metadata.thumbnail {
        match state
            .store
            .save_thumbnail(&author.username, &thumbnail.extension, &thumbnail.bytes)
            .await
        {
            Ok(file) => thumbnail_path = Some(file.relative_path),
            // A lost thumbnail is cosmetic; the submission proceeds.
            Err(err) => {
                tracing::warn!(error = %err, adventure = %metadata.name, "Failed to store thumbnail");
            }
        }
    }

    let input = CreateAdventure {
        name: metadata.name.clone(),
        description: metadata
            .description
            .or(request.description)
            .unwrap_or_default(),
        author_id: author.id,
        file_path: stored.relative_path.clone(),
        file_size: stored.size as i64,
        game_version: metadata.game_version,
        builder_version: metadata.builder_version,
        thumbnail_path: thumbnail_path.clone(),
        tag_ids: request.tag_ids,
    };

    let adventure = match AdventureRepo::create_pending(&state.pool, &input).await {
        Ok(adventure) => adventure,
        Err(err) => {
            // Orphaned files would otherwise accumulate under the upload root.
            state.store.remove(&stored.relative_path).await;
            if let Some(path) = &thumbnail_path {
                state.store.remove(path).await;
            }
            return Err(err.into());
        }
    };

    if let Err(err) = StatisticRepo::increment(&state.pool, STAT_UPLOADS, 1).await {
        tracing::warn!(error = %err, "Failed to record upload statistic");
    }

    tracing::info!(
        adventure_id = adventure.id,
        name = %adventure.name,
        author = %author.username,
        "Adventure submitted for moderation"
    );
    Ok(adventure)
}

/// Enforce the name collision and version progression rules.
///
/// Pending and approved records block a name case-insensitively. The
/// author's own approved record is the one exception: it admits a
/// resubmission whose version is strictly higher.
async fn check_name_and_version(
    state: &AppState,
    author: &User,
    name: &str,
    game_version: &str,
) -> AppResult<()> {
    let Some(blocking) = AdventureRepo::find_blocking_by_name(&state.pool, name).await? else {
        return Ok(());
    };

    if blocking.status == STATUS_PENDING || blocking.author_id != author.id {
        return Err(AppError::Submit(SubmitError::NameInUse(name.to_string())));
    }

    match is_strictly_greater(game_version, &blocking.game_version) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::Submit(SubmitError::VersionNotHigher {
            submitted: game_version.to_string(),
            current: blocking.game_version,
        })),
        Err(err) => Err(AppError::Submit(SubmitError::Version(err))),
    }
}
