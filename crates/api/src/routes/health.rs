use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the package upload directory is writable.
    pub storage_healthy: bool,
}

/// GET /health -- database reachability plus upload-root writability.
///
/// Package downloads are served straight from disk, so a read-only or
/// missing upload root degrades the service even when the database is up.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = advstore_db::health_check(&state.pool).await.is_ok();
    let storage_healthy = state.store.check_writable().await.is_ok();

    let status = if db_healthy && storage_healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        storage_healthy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
