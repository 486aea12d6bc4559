//! Authentication endpoints: login, registration, logout, identity.
//!
//! Login creates the session's reasoning instance; logout evicts it. The
//! bearer token returned by login is the key into the session store for
//! every authenticated endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::application::api::{ApiError, AppState, authorize, bearer_token};
use crate::domain::models::{Role, UserRecord};
use crate::domain::services::{hash_password, verify_password};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<Value>, ApiError> {
    let users = state.storage.load_users();
    let record = users
        .users
        .get(&request.username)
        .ok_or(ApiError::Unauthorized)?;
    if !verify_password(&request.password, &record.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let rules = state.storage.load_rules();
    let token = state
        .sessions
        .create(&request.username, record.role, rules)
        .await;

    Ok(Json(json!({
        "token": token,
        "username": request.username,
        "role": record.role,
    })))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password must not be empty".to_string(),
        ));
    }

    let mut users = state.storage.load_users();
    if users.users.contains_key(&request.username) {
        return Err(ApiError::BadRequest("Username already taken".to_string()));
    }

    let password_hash = hash_password(&request.password)
        .ok_or_else(|| ApiError::Internal("Password hashing failed".to_string()))?;
    users.users.insert(
        request.username.clone(),
        UserRecord {
            password_hash,
            role: Role::User,
            created_at: Utc::now(),
        },
    );
    state.storage.save_users(&users)?;
    info!(username = %request.username, "user registered");

    Ok(Json(json!({ "message": "Registration successful" })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers).await?;
    if let Some(token) = bearer_token(&headers) {
        state.sessions.remove(token).await;
    }
    Ok(Json(json!({ "message": "Logged out" })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    Ok(Json(json!({
        "username": session.username,
        "role": session.role,
    })))
}
