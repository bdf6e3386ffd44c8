//! HTTP-level integration tests for the admin surface: settings, tag
//! management, and direct adventure edits.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get, get_auth, login_token, post_json_auth, post_multipart, put_json_auth,
    MultipartForm,
};
use sqlx::PgPool;

use advstore_core::roles::{ROLE_ADMIN, ROLE_MODERATOR, ROLE_USER};
use advstore_db::repositories::TagRepo;

/// Submit a package as `token` and return the new adventure id.
async fn submit_adventure(
    app: &common::TestApp,
    pool: &PgPool,
    token: &str,
    name: &str,
    version: &str,
) -> i64 {
    let tag = TagRepo::list(pool).await.unwrap()[0].id;
    let form = MultipartForm::new()
        .file("file", "pkg.zip", &common::make_package(name, version))
        .text("tags", &tag.to_string());
    let response = post_multipart(app, "/api/v1/adventures", Some(token), None, form).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// A zip archive with no `game_data.json` descriptor at all.
fn descriptorless_zip() -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("scenes/intro.txt", options).unwrap();
        std::io::Write::write_all(&mut writer, b"You wake in darkness.").unwrap();
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// Settings can be read and updated; the upload ceiling must stay a
/// positive MB count.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_update_and_guard(pool: PgPool) {
    let (_admin, password) = common::create_test_user(&pool, "boss", ROLE_ADMIN).await;
    let app = common::build_test_app(pool).await;
    let token = login_token(&app, "boss", &password).await;

    let listed = body_json(get_auth(&app, "/api/v1/admin/settings", &token).await).await;
    let names: Vec<&str> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["setting_name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"max_upload_size"));
    assert!(names.contains(&"theme"));

    let updated = put_json_auth(
        &app,
        "/api/v1/admin/settings",
        &token,
        serde_json::json!({ "setting_name": "theme", "setting_value": "dark" }),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);

    let zero = put_json_auth(
        &app,
        "/api/v1/admin/settings",
        &token,
        serde_json::json!({ "setting_name": "max_upload_size", "setting_value": "0" }),
    )
    .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);
}

/// Tags can be created (duplicates refused) and deleted.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tag_management(pool: PgPool) {
    let (_admin, password) = common::create_test_user(&pool, "boss", ROLE_ADMIN).await;
    let app = common::build_test_app(pool.clone()).await;
    let token = login_token(&app, "boss", &password).await;

    let created = post_json_auth(
        &app,
        "/api/v1/admin/tags",
        &token,
        serde_json::json!({ "name": "Nautical" }),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let tag_id = body_json(created).await["data"]["id"].as_i64().unwrap();

    let duplicate = post_json_auth(
        &app,
        "/api/v1/admin/tags",
        &token,
        serde_json::json!({ "name": "Nautical" }),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let deleted = common::send_delete_auth(&app, &format!("/api/v1/admin/tags/{tag_id}"), &token)
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    assert!(TagRepo::find_by_id(&pool, tag_id).await.unwrap().is_none());
}

/// Direct metadata edits bypass the moderation flow; unknown tags refuse
/// the whole update.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_adventure_metadata(pool: PgPool) {
    let (_author, author_pw) = common::create_test_user(&pool, "author", ROLE_USER).await;
    let (_admin, admin_pw) = common::create_test_user(&pool, "boss", ROLE_ADMIN).await;
    let app = common::build_test_app(pool.clone()).await;
    let author_token = login_token(&app, "author", &author_pw).await;
    let admin_token = login_token(&app, "boss", &admin_pw).await;

    let id = submit_adventure(&app, &pool, &author_token, "Ember Keep", "1.0.0").await;

    let edited = put_json_auth(
        &app,
        &format!("/api/v1/admin/adventures/{id}"),
        &admin_token,
        serde_json::json!({
            "name": "Ember Keep Remastered",
            "description": "Rebalanced edition.",
            "status": 1
        }),
    )
    .await;
    assert_eq!(edited.status(), StatusCode::OK);
    let json = body_json(edited).await;
    assert_eq!(json["data"]["name"], "Ember Keep Remastered");
    assert_eq!(json["data"]["status"], 1);

    // Forcing status 1 makes it publicly visible without moderation.
    let catalogue = body_json(get(&app, "/api/v1/adventures").await).await;
    assert_eq!(catalogue["data"].as_array().unwrap().len(), 1);

    let bad_tags = put_json_auth(
        &app,
        &format!("/api/v1/admin/adventures/{id}"),
        &admin_token,
        serde_json::json!({ "tag_ids": [999_999] }),
    )
    .await;
    assert_eq!(bad_tags.status(), StatusCode::BAD_REQUEST);
}

/// Replacing a package refreshes the declared versions from the new
/// archive's descriptor; a descriptor-less archive falls back to the
/// form-supplied version.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_package(pool: PgPool) {
    let (_author, author_pw) = common::create_test_user(&pool, "author", ROLE_USER).await;
    let (_admin, admin_pw) = common::create_test_user(&pool, "boss", ROLE_ADMIN).await;
    let app = common::build_test_app(pool.clone()).await;
    let author_token = login_token(&app, "author", &author_pw).await;
    let admin_token = login_token(&app, "boss", &admin_pw).await;

    let id = submit_adventure(&app, &pool, &author_token, "Glass Labyrinth", "1.0.0").await;

    // New archive with a descriptor: its version wins.
    let form = MultipartForm::new().file(
        "file",
        "relabelled.zip",
        &common::make_package("Glass Labyrinth", "3.0.0"),
    );
    let replaced = post_multipart(
        &app,
        &format!("/api/v1/admin/adventures/{id}/package"),
        Some(&admin_token),
        None,
        form,
    )
    .await;
    assert_eq!(replaced.status(), StatusCode::OK);
    assert_eq!(body_json(replaced).await["data"]["game_version"], "3.0.0");

    // Descriptor-less archive: the form-supplied version is used instead.
    let form = MultipartForm::new()
        .file("file", "bare.zip", &descriptorless_zip())
        .text("game_version", "3.0.1");
    let fallback = post_multipart(
        &app,
        &format!("/api/v1/admin/adventures/{id}/package"),
        Some(&admin_token),
        None,
        form,
    )
    .await;
    assert_eq!(fallback.status(), StatusCode::OK);
    let json = body_json(fallback).await;
    assert_eq!(json["data"]["game_version"], "3.0.1");
    // No descriptor means no thumbnail either.
    assert!(json["data"]["thumbnail_path"].is_null());

    // A byte stream that is not a zip at all is still refused.
    let form = MultipartForm::new().file("file", "broken.zip", b"not an archive");
    let broken = post_multipart(
        &app,
        &format!("/api/v1/admin/adventures/{id}/package"),
        Some(&admin_token),
        None,
        form,
    )
    .await;
    assert_eq!(broken.status(), StatusCode::BAD_REQUEST);
}

/// Admin deletion removes an adventure regardless of lifecycle state.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_delete_adventure(pool: PgPool) {
    let (_author, author_pw) = common::create_test_user(&pool, "author", ROLE_USER).await;
    let (_moderator, mod_pw) = common::create_test_user(&pool, "mod", ROLE_MODERATOR).await;
    let (_admin, admin_pw) = common::create_test_user(&pool, "boss", ROLE_ADMIN).await;
    let app = common::build_test_app(pool.clone()).await;
    let author_token = login_token(&app, "author", &author_pw).await;
    let mod_token = login_token(&app, "mod", &mod_pw).await;
    let admin_token = login_token(&app, "boss", &admin_pw).await;

    let id = submit_adventure(&app, &pool, &author_token, "Sunken Spire", "1.0.0").await;
    let approve =
        common::post_empty_auth(&app, &format!("/api/v1/moderation/{id}/approve"), &mod_token)
            .await;
    assert_eq!(approve.status(), StatusCode::OK);

    let deleted =
        common::send_delete_auth(&app, &format!("/api/v1/admin/adventures/{id}"), &admin_token)
            .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let detail = get(&app, &format!("/api/v1/adventures/{id}")).await;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);

    let gone_again =
        common::send_delete_auth(&app, &format!("/api/v1/admin/adventures/{id}"), &admin_token)
            .await;
    assert_eq!(gone_again.status(), StatusCode::NOT_FOUND);
}
