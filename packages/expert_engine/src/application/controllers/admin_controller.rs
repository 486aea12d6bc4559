//! User administration endpoints (admin only).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::application::api::{ApiError, AppState, authorize_admin};
use crate::domain::models::Role;
use crate::domain::services::DEFAULT_ADMIN_USERNAME;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    #[serde(default)]
    pub role: String,
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize_admin(&state, &headers).await?;

    let users = state.storage.load_users();
    let listing: Vec<Value> = users
        .users
        .iter()
        .map(|(username, record)| {
            json!({
                "username": username,
                "role": record.role,
                "created_at": record.created_at,
            })
        })
        .collect();
    Ok(Json(json!({ "users": listing })))
}

/// PUT /api/admin/users/{username}/role
pub async fn update_user_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<Value>, ApiError> {
    authorize_admin(&state, &headers).await?;

    let role = match request.role.as_str() {
        "admin" => Role::Admin,
        "user" => Role::User,
        _ => return Err(ApiError::BadRequest("Invalid role".to_string())),
    };

    let mut users = state.storage.load_users();
    let record = users
        .users
        .get_mut(&username)
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;
    record.role = role;
    state.storage.save_users(&users)?;

    // Role changes take effect in live sessions immediately.
    state.sessions.update_role(&username, role).await;
    info!(username = %username, role = role.as_str(), "user role updated");

    Ok(Json(json!({ "message": "Role updated" })))
}

/// DELETE /api/admin/users/{username}
pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize_admin(&state, &headers).await?;

    if username == DEFAULT_ADMIN_USERNAME {
        return Err(ApiError::BadRequest(
            "The admin account cannot be deleted".to_string(),
        ));
    }

    let mut users = state.storage.load_users();
    if users.users.remove(&username).is_none() {
        return Err(ApiError::NotFound("User does not exist".to_string()));
    }
    state.storage.save_users(&users)?;
    state.sessions.remove_user(&username).await;
    info!(username = %username, "user deleted");

    Ok(Json(json!({ "message": "User deleted" })))
}
