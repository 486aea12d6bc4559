//! Fact store endpoints for the calling session.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::application::api::{ApiError, AppState, authorize};

#[derive(Debug, Deserialize)]
pub struct FactsRequest {
    #[serde(default)]
    pub facts: Vec<String>,
}

/// GET /api/facts/atoms — leaf names the user can assert directly.
pub async fn get_atoms(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    let reasoning = session.reasoning.lock().await;
    Ok(Json(json!({ "atoms": reasoning.atoms() })))
}

/// GET /api/facts/conclusions — names some rule can derive.
pub async fn get_conclusions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    let reasoning = session.reasoning.lock().await;
    Ok(Json(json!({ "conclusions": reasoning.conclusions() })))
}

/// GET /api/facts/known
pub async fn get_known_facts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    let reasoning = session.reasoning.lock().await;
    Ok(Json(json!({
        "user_facts": reasoning.user_facts(),
        "derived_facts": reasoning.derived_facts(),
    })))
}

/// POST /api/facts/known — replace the user-asserted fact set.
pub async fn set_known_facts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<FactsRequest>,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    let mut reasoning = session.reasoning.lock().await;
    reasoning.set_user_facts(request.facts)?;
    Ok(Json(json!({ "message": "Facts updated" })))
}

/// GET /api/facts/false
pub async fn get_false_facts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    let reasoning = session.reasoning.lock().await;
    Ok(Json(json!({ "facts": reasoning.false_facts() })))
}

/// POST /api/facts/false — replace the known-false fact set.
pub async fn set_false_facts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<FactsRequest>,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    let mut reasoning = session.reasoning.lock().await;
    reasoning.set_false_facts(request.facts)?;
    Ok(Json(json!({ "message": "Facts updated" })))
}

/// POST /api/facts/clear — drop all fact and derivation state.
pub async fn clear_facts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    let mut reasoning = session.reasoning.lock().await;
    reasoning.reset_state();
    Ok(Json(json!({ "message": "Facts cleared" })))
}
