//! Unified error types for the CreativeFlow backend.
//! Used by: config, security, dependencies, handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("signing error: {0}")]
    Signing(String),

    #[error("password hashing error: {0}")]
    Hashing(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Config(_)
            | Error::Signing(_)
            | Error::Hashing(_)
            | Error::Database(_)
            | Error::Cache(_)
            | Error::Serialization(_)
            | Error::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Wraps a poisoned-lock error for the named resource.
pub fn lock_err<E: std::fmt::Display>(resource: &'static str) -> impl Fn(E) -> Error {
    move |e| Error::Internal(format!("{resource} lock poisoned: {e}"))
}
