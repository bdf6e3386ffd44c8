//! Route tree construction.

pub mod health;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin, adventures, auth, external, moderation, notifications, tags};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                        register (public)
/// /auth/login                           login (public)
/// /auth/me                              own profile (auth)
///
/// /adventures                           list approved (GET), submit (POST, auth)
/// /adventures/{id}                      detail (GET)
/// /adventures/{id}/download             download archive (GET)
/// /adventures/{id}/rate                 set rating (POST, auth)
/// /adventures/{id}/reviews              write review (POST, auth)
/// /my/adventures                        own submissions (GET, auth)
///
/// /tags                                 list (GET)
/// /tags/popular                         popularity ranking (GET)
///
/// /notifications                        list + unread count (GET, auth)
/// /notifications/read-all               mark all read (POST, auth)
///
/// /moderation/pending                   queue (GET, moderator)
/// /moderation/{id}/approve              approve (POST, moderator)
/// /moderation/{id}/reject               reject + delete (POST, moderator)
///
/// /admin/dashboard                      headline counts (GET, admin)
/// /admin/users                          list (GET), create (POST) (admin)
/// /admin/users/{id}/role                change role (PUT, admin)
/// /admin/settings                       list (GET), update (PUT) (admin)
/// /admin/tags                           create (POST, admin)
/// /admin/tags/{id}                      delete (DELETE, admin)
/// /admin/adventures/{id}                edit metadata (PUT), delete (DELETE) (admin)
/// /admin/adventures/{id}/package        replace archive (POST, admin)
/// /admin/api-keys                       list (GET), create (POST) (admin)
/// /admin/api-keys/{id}                  delete (DELETE, admin)
/// /admin/api-keys/{id}/revoke           revoke (POST, admin)
/// /admin/api-logs                       audit log (GET, admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth.
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Catalogue and community.
        .route("/adventures", get(adventures::list).post(adventures::submit))
        .route("/adventures/{id}", get(adventures::detail))
        .route("/adventures/{id}/download", get(adventures::download))
        .route("/adventures/{id}/rate", post(adventures::rate))
        .route("/adventures/{id}/reviews", post(adventures::create_review))
        .route("/my/adventures", get(adventures::my_adventures))
        // Tags.
        .route("/tags", get(tags::list))
        .route("/tags/popular", get(tags::popular))
        // Notifications.
        .route("/notifications", get(notifications::list))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        // Moderation.
        .route("/moderation/pending", get(moderation::list_pending))
        .route("/moderation/{id}/approve", post(moderation::approve))
        .route("/moderation/{id}/reject", post(moderation::reject))
        // Admin.
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/users", get(admin::list_users).post(admin::create_user))
        .route("/admin/users/{id}/role", put(admin::update_user_role))
        .route(
            "/admin/settings",
            get(admin::list_settings).put(admin::update_setting),
        )
        .route("/admin/tags", post(admin::create_tag))
        .route("/admin/tags/{id}", delete(admin::delete_tag))
        .route(
            "/admin/adventures/{id}",
            put(admin::update_adventure).delete(admin::delete_adventure),
        )
        .route("/admin/adventures/{id}/package", post(admin::replace_package))
        .route(
            "/admin/api-keys",
            get(admin::list_api_keys).post(admin::create_api_key),
        )
        .route("/admin/api-keys/{id}", delete(admin::delete_api_key))
        .route("/admin/api-keys/{id}/revoke", post(admin::revoke_api_key))
        .route("/admin/api-logs", get(admin::list_api_logs))
}

/// Build the `/api/v2` external route tree (X-API-Key authenticated).
///
/// ```text
/// /submit               submit package (POST)
/// /tags                 list tags (GET)
/// /title-availability   probe a name (GET)
/// ```
pub fn external_routes() -> Router<AppState> {
    Router::new()
        .route("/submit", post(external::submit))
        .route("/tags", get(external::tags))
        .route("/title-availability", get(external::title_availability))
}
