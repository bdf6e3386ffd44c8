//! HTTP-level integration tests for registration, login, and RBAC.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, login_token, post_json};
use sqlx::PgPool;

use advstore_core::roles::{ROLE_ADMIN, ROLE_USER};

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Successful registration returns 201 with a token and the new user.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_success(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = post_json(
        &app,
        "/api/v1/auth/register",
        serde_json::json!({
            "username": "newuser",
            "email": "newuser@test.com",
            "password": "long_enough_password"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["user"]["username"], "newuser");
    assert_eq!(json["user"]["role"], "user");
}

/// Duplicate usernames are refused with 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_duplicate_username(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let body = serde_json::json!({
        "username": "dupe",
        "email": "dupe@test.com",
        "password": "long_enough_password"
    });
    let first = post_json(&app, "/api/v1/auth/register", body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(
        &app,
        "/api/v1/auth/register",
        serde_json::json!({
            "username": "dupe",
            "email": "other@test.com",
            "password": "long_enough_password"
        }),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let json = body_json(second).await;
    assert_eq!(json["code"], "CONFLICT");
}

/// Short passwords and malformed emails are refused with 400.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_validation(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let short_pw = post_json(
        &app,
        "/api/v1/auth/register",
        serde_json::json!({
            "username": "valid",
            "email": "valid@test.com",
            "password": "short"
        }),
    )
    .await;
    assert_eq!(short_pw.status(), StatusCode::BAD_REQUEST);

    let bad_email = post_json(
        &app,
        "/api/v1/auth/register",
        serde_json::json!({
            "username": "valid",
            "email": "not-an-email",
            "password": "long_enough_password"
        }),
    )
    .await;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login and profile
// ---------------------------------------------------------------------------

/// Wrong password returns 401 with the same message as an unknown user.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    common::create_test_user(&pool, "loginuser", ROLE_USER).await;
    let app = common::build_test_app(pool).await;

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "loginuser@test.com", "password": "incorrect" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let unknown = post_json(
        &app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "ghost@test.com", "password": "whatever" }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

/// The login credential is the email address, not the username.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_by_email(pool: PgPool) {
    let (user, password) = common::create_test_user(&pool, "mailbound", ROLE_USER).await;
    let app = common::build_test_app(pool).await;

    let by_username = post_json(
        &app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "mailbound", "password": password }),
    )
    .await;
    assert_eq!(by_username.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        &app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "mailbound@test.com", "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["username"], "mailbound");
}

/// /auth/me reflects the logged-in user.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me(pool: PgPool) {
    let (user, password) = common::create_test_user(&pool, "profiled", ROLE_USER).await;
    let app = common::build_test_app(pool).await;

    let token = login_token(&app, "profiled", &password).await;
    let response = get_auth(&app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], user.id);
    assert_eq!(json["username"], "profiled");
    assert_eq!(json["email"], "profiled@test.com");
}

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

/// Admin endpoints reject anonymous and non-admin callers.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_requires_admin_role(pool: PgPool) {
    let (_user, password) = common::create_test_user(&pool, "pleb", ROLE_USER).await;
    let (_admin, admin_password) = common::create_test_user(&pool, "boss", ROLE_ADMIN).await;
    let app = common::build_test_app(pool).await;

    let anonymous = common::get(&app, "/api/v1/admin/users").await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let user_token = login_token(&app, "pleb", &password).await;
    let forbidden = get_auth(&app, "/api/v1/admin/users", &user_token).await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let admin_token = login_token(&app, "boss", &admin_password).await;
    let allowed = get_auth(&app, "/api/v1/admin/users", &admin_token).await;
    assert_eq!(allowed.status(), StatusCode::OK);
}

/// An admin can create an account with any valid role directly.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_creates_user(pool: PgPool) {
    let (_admin, password) = common::create_test_user(&pool, "boss", ROLE_ADMIN).await;
    let app = common::build_test_app(pool).await;
    let token = login_token(&app, "boss", &password).await;

    let response = common::post_json_auth(
        &app,
        "/api/v1/admin/users",
        &token,
        serde_json::json!({
            "username": "handpicked",
            "email": "handpicked@test.com",
            "password": "sturdy-passphrase-1",
            "role": "moderator"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "handpicked");
    assert_eq!(json["data"]["role"], "moderator");

    // The new account can log in immediately.
    let login = common::post_json(
        &app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": "handpicked@test.com", "password": "sturdy-passphrase-1" }),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);

    // Made-up roles are refused.
    let bad_role = common::post_json_auth(
        &app,
        "/api/v1/admin/users",
        &token,
        serde_json::json!({
            "username": "impostor",
            "email": "impostor@test.com",
            "password": "sturdy-passphrase-1",
            "role": "superuser"
        }),
    )
    .await;
    assert_eq!(bad_role.status(), StatusCode::BAD_REQUEST);
}

/// The last remaining admin cannot be demoted.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cannot_demote_last_admin(pool: PgPool) {
    let (admin, password) = common::create_test_user(&pool, "solo-admin", ROLE_ADMIN).await;
    let app = common::build_test_app(pool).await;
    let token = login_token(&app, "solo-admin", &password).await;

    let response = common::put_json_auth(
        &app,
        &format!("/api/v1/admin/users/{}/role", admin.id),
        &token,
        serde_json::json!({ "role": "user" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
