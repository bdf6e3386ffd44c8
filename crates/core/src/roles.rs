//! Well-known role name constants.
//!
//! These must match the role values seeded by the initial migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_USER: &str = "user";

/// All valid role names, used to validate admin role-change requests.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MODERATOR, ROLE_USER];

/// Whether a role may moderate submissions (approve/reject).
pub fn can_moderate(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_MODERATOR
}
