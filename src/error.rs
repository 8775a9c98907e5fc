//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` enum for all request-scoped error conditions and
//! implements Axum's `IntoResponse` so a failing request turns into a JSON
//! error body instead of taking the process down.
//!
//! Error mappings:
//! - `RepoNotFound`, `RefNotFound`, `PathNotFound`, `NotFound` → 404
//! - `NotADirectory`, `NotAFile` → 400
//! - `InvalidCredentials` → 401
//! - `AnnotationTimeout` → 504
//! - `Git`, `Traversal`, `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Reference not found: {0}")]
    RefNotFound(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    /// Unknown route, ignored organization, or no read grant. All three
    /// render identically so private organizations do not leak.
    #[error("Not found")]
    NotFound,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("History traversal failed for {path}: {source}")]
    Traversal {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("Annotation timed out after {0:?}")]
    AnnotationTimeout(std::time::Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::RepoNotFound(_)
            | AppError::RefNotFound(_)
            | AppError::PathNotFound(_)
            | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::NotADirectory(_) | AppError::NotAFile(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::AnnotationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Git(_) | AppError::Traversal { .. } | AppError::Internal(_) => {
                tracing::error!("request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
