//! Shared plumbing for the HTTP controllers: application state, the API
//! error type, and bearer-token authorization.

use std::sync::Arc;

use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::{EngineError, StorageError};
use crate::domain::models::Role;
use crate::domain::services::{DataStorage, SessionEntry, SessionStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<DataStorage>,
    pub sessions: Arc<SessionStore>,
}

/// Error responses rendered as `{"error": ...}` JSON bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Admin privileges required")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::FactConflict(_) => ApiError::Conflict(err.to_string()),
            EngineError::NoActiveGoal => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Extract the bearer token from an Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the calling session or reject with 401.
pub async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<SessionEntry, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    state
        .sessions
        .get(token)
        .await
        .ok_or(ApiError::Unauthorized)
}

/// Resolve the calling session and require the admin role.
pub async fn authorize_admin(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SessionEntry, ApiError> {
    let session = authorize(state, headers).await?;
    if session.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    Ok(session)
}
