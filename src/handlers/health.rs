//! Liveness and readiness endpoints.
//! Used by: server.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub database: bool,
    pub cache: bool,
}

/// Pings the database and the cache; 503 unless both answer.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let database = state
        .database
        .ping()
        .inspect_err(|e| tracing::warn!(error = %e, "database not ready"))
        .is_ok();
    let cache = state
        .cache
        .ping()
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "cache not ready"))
        .is_ok();

    let status = if database && cache {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(Readiness { database, cache }))
}
