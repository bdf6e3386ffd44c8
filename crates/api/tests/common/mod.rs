//! Shared test harness: builds the full application router (all middleware
//! layers, a temp upload directory, a fixed JWT secret) plus request and
//! fixture helpers.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use zip::write::SimpleFileOptions;

use advstore_api::auth::jwt::JwtConfig;
use advstore_api::auth::password::hash_password;
use advstore_api::config::ServerConfig;
use advstore_api::routes;
use advstore_api::state::AppState;
use advstore_api::storage::PackageStore;
use advstore_db::models::user::{CreateUser, User};
use advstore_db::repositories::UserRepo;

/// A fully wired application plus the temp dir its uploads live in.
pub struct TestApp {
    pub router: Router,
    _upload_dir: tempfile::TempDir,
}

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config(upload_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: upload_dir.to_path_buf(),
        body_limit_bytes: 256 * 1024 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub async fn build_test_app(pool: PgPool) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("tempdir should be creatable");
    let config = test_config(upload_dir.path());

    let store = PackageStore::new(upload_dir.path());
    store.init().await.expect("storage init should succeed");

    let state = AppState {
        pool,
        config: Arc::new(config),
        store: Arc::new(store),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .nest("/api/v2", routes::external_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(DefaultBodyLimit::max(state.config.body_limit_bytes))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    TestApp {
        router,
        _upload_dir: upload_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &TestApp, path: &str) -> Response<Body> {
    send(app, Request::get(path).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: &TestApp, path: &str, token: &str) -> Response<Body> {
    send(
        app,
        Request::get(path)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: &TestApp, path: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        Request::post(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_json_auth(
    app: &TestApp,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(
        app,
        Request::post(path)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn put_json_auth(
    app: &TestApp,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(
        app,
        Request::put(path)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_empty_auth(app: &TestApp, path: &str, token: &str) -> Response<Body> {
    send(
        app,
        Request::post(path)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn send_delete_auth(app: &TestApp, path: &str, token: &str) -> Response<Body> {
    send(
        app,
        Request::delete(path)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// POST a multipart body, optionally with a Bearer token or an X-API-Key.
pub async fn post_multipart(
    app: &TestApp,
    path: &str,
    token: Option<&str>,
    api_key: Option<&str>,
    form: MultipartForm,
) -> Response<Body> {
    let mut builder = Request::post(path).header(
        CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", form.boundary),
    );
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    send(app, builder.body(Body::from(form.finish())).unwrap()).await
}

async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router
        .clone()
        .oneshot(request)
        .await
        .expect("request should not fail at the transport level")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Multipart builder
// ---------------------------------------------------------------------------

/// Hand-rolled multipart/form-data body builder.
pub struct MultipartForm {
    pub boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "test-boundary-7MA4YWxkTrZu0gW".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/zip\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Minimal valid PNG header bytes, enough for image format sniffing.
pub const PNG_MAGIC: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
    b'R',
];

/// Build an in-memory package archive with a `game_data.json` descriptor
/// and a conventional thumbnail.
pub fn make_package(name: &str, version: &str) -> Vec<u8> {
    make_package_with(name, version, true)
}

pub fn make_package_with(name: &str, version: &str, thumbnail: bool) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = SimpleFileOptions::default();

        let descriptor = serde_json::json!({
            "game_info": {
                "name": name,
                "version": version,
                "builder_version": "2.1",
                "description": "An adventure for testing",
            }
        });
        writer.start_file("game_data.json", options).unwrap();
        std::io::Write::write_all(&mut writer, descriptor.to_string().as_bytes()).unwrap();

        if thumbnail {
            writer.start_file("thumbnail.png", options).unwrap();
            std::io::Write::write_all(&mut writer, PNG_MAGIC).unwrap();
        }

        writer.start_file("scenes/intro.txt", options).unwrap();
        std::io::Write::write_all(&mut writer, b"You wake up in a dark room.").unwrap();

        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// Create a user directly in the database and return the row plus the
/// plaintext password.
pub async fn create_test_user(pool: &PgPool, username: &str, role: &str) -> (User, String) {
    let password = "test_password_123!";
    let hashed = hash_password(password).expect("hashing should succeed");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password_hash: hashed,
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed");
    (user, password.to_string())
}

/// Log in via the API and return the access token. Users created through
/// [`create_test_user`] get a `{username}@test.com` address.
pub async fn login_token(app: &TestApp, username: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/api/v1/auth/login",
        serde_json::json!({ "email": format!("{username}@test.com"), "password": password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["access_token"]
        .as_str()
        .expect("login must return access_token")
        .to_string()
}
