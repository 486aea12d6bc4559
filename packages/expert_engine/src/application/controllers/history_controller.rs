//! Inference-history endpoints. Users see and manage their own records;
//! admins see everyone's.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use serde_json::{Value, json};

use crate::application::api::{ApiError, AppState, authorize};
use crate::domain::models::Role;

const DEFAULT_PER_PAGE: usize = 20;

/// GET /api/history?page=&per_page=
pub async fn get_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;

    let mut history = state.storage.load_history();
    if session.role != Role::Admin {
        history.retain(|record| record.username == session.username);
    }
    // Newest first.
    history.reverse();

    let page: usize = params
        .get("page")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(1)
        .max(1);
    let per_page: usize = params
        .get("per_page")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_PER_PAGE)
        .max(1);

    let total = history.len();
    let start = (page - 1) * per_page;
    let slice: Vec<_> = history.into_iter().skip(start).take(per_page).collect();

    Ok(Json(json!({
        "history": slice,
        "total": total,
        "page": page,
        "per_page": per_page,
    })))
}

/// DELETE /api/history/{id}
pub async fn delete_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(history_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;

    let mut history = state.storage.load_history();
    let before = history.len();
    history.retain(|record| {
        record.id != history_id
            || (session.role != Role::Admin && record.username != session.username)
    });

    if history.len() == before {
        return Err(ApiError::NotFound(
            "Record does not exist or is not yours to delete".to_string(),
        ));
    }
    state.storage.save_history(history)?;
    Ok(Json(json!({ "message": "Record deleted" })))
}

/// POST /api/history/clear — admins clear everything, users their own.
pub async fn clear_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;

    let remaining = if session.role == Role::Admin {
        Vec::new()
    } else {
        let mut history = state.storage.load_history();
        history.retain(|record| record.username != session.username);
        history
    };
    state.storage.save_history(remaining)?;
    Ok(Json(json!({ "message": "History cleared" })))
}
