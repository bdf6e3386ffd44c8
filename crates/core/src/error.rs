//! Shared domain error type.
//!
//! [`CoreError`] covers the generic failure classes the HTTP layer maps to
//! status codes. Component-specific taxonomies ([`crate::package::PackageError`],
//! [`crate::version::VersionError`], [`crate::submission::SubmitError`]) convert
//! into it at the boundary.

use crate::types::DbId;

/// Domain-level error shared across all crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced entity does not exist (or is no longer in the expected state).
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Input failed a validation rule. The message is safe to show to callers.
    #[error("{0}")]
    Validation(String),

    /// The operation conflicts with current state.
    #[error("{0}")]
    Conflict(String),

    /// The caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller is authenticated but not allowed to do this.
    #[error("{0}")]
    Forbidden(String),

    /// An internal failure whose detail must not leak to callers.
    #[error("{0}")]
    Internal(String),
}
