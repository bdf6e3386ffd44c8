//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireModerator`] -- Requires `moderator` or `admin` role.
//! - [`api_key::ApiKeyIdentity`] -- Authenticates external API calls via `X-API-Key`.

pub mod api_key;
pub mod auth;
pub mod rbac;
