//! Submission validation rules.
//!
//! Pure checks enforced before a package is admitted: filename extension,
//! size ceiling, tag presence. The taxonomy in [`SubmitError`] also covers
//! the ownership and version rules evaluated against the database by the
//! API layer, so every rejection reason reaches the caller through one type.

use crate::package::PackageError;
use crate::version::VersionError;

/// Default upload size ceiling in megabytes when the site setting is absent.
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 50;

/// Name of the site setting holding the upload ceiling (in MB).
pub const MAX_UPLOAD_SETTING: &str = "max_upload_size";

/// Reasons a submission is rejected before reaching moderation.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("only ZIP files are allowed")]
    UnsupportedFileType,

    #[error("file size ({size_mb}MB) exceeds the maximum allowed size ({max_mb}MB)")]
    FileTooLarge { size_mb: u64, max_mb: u64 },

    #[error("one or more provided tag IDs are invalid")]
    InvalidTags,

    #[error("adventure name '{0}' is already in use by another author")]
    NameInUse(String),

    #[error("new version ({submitted}) must be higher than the current active version ({current})")]
    VersionNotHigher { submitted: String, current: String },

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Package(#[from] PackageError),
}

/// Convert a configured ceiling in MB to bytes.
pub fn max_upload_bytes(max_mb: u64) -> u64 {
    max_mb * 1024 * 1024
}

/// Check the upload filename carries a `.zip` extension (case-insensitive).
pub fn validate_filename(filename: &str) -> Result<(), SubmitError> {
    if filename.to_ascii_lowercase().ends_with(".zip") && filename.len() > ".zip".len() {
        Ok(())
    } else {
        Err(SubmitError::UnsupportedFileType)
    }
}

/// Check the observed size against the configured ceiling.
pub fn validate_size(size_bytes: u64, max_mb: u64) -> Result<(), SubmitError> {
    if size_bytes > max_upload_bytes(max_mb) {
        Err(SubmitError::FileTooLarge {
            size_mb: size_bytes / (1024 * 1024),
            max_mb,
        })
    } else {
        Ok(())
    }
}

/// Check that at least one tag id was supplied.
pub fn validate_tag_selection(tag_ids: &[crate::types::DbId]) -> Result<(), SubmitError> {
    if tag_ids.is_empty() {
        Err(SubmitError::InvalidTags)
    } else {
        Ok(())
    }
}
