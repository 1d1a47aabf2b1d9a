//! API v1 status endpoint.
//! Used by: server.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "API v1 is running",
    })
}
