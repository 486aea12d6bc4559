//! Inference endpoints: forward chaining and the interactive backward
//! search.
//!
//! Backward chaining spans several requests: `start` opens the search and
//! runs until the engine either settles or suspends with facts to confirm;
//! `continue` feeds the user's answers back and resumes. Between those
//! requests the engine's frame stack sits untouched inside the session's
//! reasoning state.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::application::api::{ApiError, AppState, authorize};
use crate::application::controllers::rule_controller::numbered_rules;
use crate::domain::models::{BackwardResult, BackwardStatus, HistoryRecord, InferenceKind};
use crate::domain::services::ReasoningService;

#[derive(Debug, Deserialize)]
pub struct BackwardStartRequest {
    #[serde(default)]
    pub target: String,
}

#[derive(Debug, Deserialize)]
pub struct BackwardContinueRequest {
    #[serde(default)]
    pub true_facts: Vec<String>,
    #[serde(default)]
    pub false_facts: Vec<String>,
}

/// POST /api/inference/forward
pub async fn forward_inference(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    let mut reasoning = session.reasoning.lock().await;

    if reasoning.user_facts().is_empty() {
        return Err(ApiError::BadRequest("Add known facts first".to_string()));
    }

    let result = reasoning.run_forward();
    info!(
        username = %session.username,
        conclusions = result.conclusions.len(),
        "forward inference"
    );

    if let Some(conclusion) = result.conclusions.first() {
        state.storage.add_history(HistoryRecord {
            id: Uuid::new_v4().to_string(),
            username: session.username.clone(),
            kind: InferenceKind::Forward,
            facts: reasoning.user_facts().to_vec(),
            conclusion: conclusion.clone(),
            path: reasoning.accumulated_path().to_vec(),
            timestamp: Utc::now(),
        })?;
    }

    Ok(Json(json!({
        "conclusions": result.conclusions,
        "path": reasoning.accumulated_path(),
        "rules": numbered_rules(reasoning.rules()),
        "known_facts": reasoning.user_facts(),
        "derived_facts": reasoning.derived_facts(),
    })))
}

/// POST /api/inference/backward/start
pub async fn start_backward(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BackwardStartRequest>,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    if request.target.is_empty() {
        return Err(ApiError::BadRequest(
            "Specify a target conclusion".to_string(),
        ));
    }

    let mut reasoning = session.reasoning.lock().await;
    let result = reasoning.start_backward(&request.target);
    step_response(
        &state,
        &session.username,
        &request.target,
        &reasoning,
        result,
    )
}

/// POST /api/inference/backward/continue
pub async fn continue_backward(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BackwardContinueRequest>,
) -> Result<Json<Value>, ApiError> {
    let session = authorize(&state, &headers).await?;
    let mut reasoning = session.reasoning.lock().await;

    let target = reasoning
        .backward_target()
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("No backward search in progress".to_string()))?;
    let result = reasoning.continue_backward(&request.true_facts, &request.false_facts)?;
    step_response(&state, &session.username, &target, &reasoning, result)
}

/// Render one backward step in the shape the frontend consumes, recording
/// a history entry when the goal was proved.
fn step_response(
    state: &AppState,
    username: &str,
    target: &str,
    reasoning: &ReasoningService,
    result: BackwardResult,
) -> Result<Json<Value>, ApiError> {
    let mut response = json!({
        "path": reasoning.accumulated_path(),
        "rules": numbered_rules(reasoning.rules()),
        "known_facts": reasoning.user_facts(),
        "derived_facts": reasoning.derived_facts(),
        "target": target,
    });

    match result.status {
        BackwardStatus::Proved => {
            info!(username = %username, target = %target, "backward goal proved");
            response["status"] = json!("success");
            response["message"] = json!(format!("Goal '{target}' proved"));
            state.storage.add_history(HistoryRecord {
                id: Uuid::new_v4().to_string(),
                username: username.to_string(),
                kind: InferenceKind::Backward,
                facts: reasoning.user_facts().to_vec(),
                conclusion: target.to_string(),
                path: reasoning.accumulated_path().to_vec(),
                timestamp: Utc::now(),
            })?;
        }
        BackwardStatus::Refuted => {
            response["status"] = json!("failed");
            response["message"] = json!(format!("Goal '{target}' could not be proved"));
        }
        BackwardStatus::NeedsFacts => {
            let user_facts = reasoning.user_facts();
            let pending: Vec<&String> = result
                .facts
                .iter()
                .filter(|&fact| !user_facts.contains(fact))
                .collect();
            response["status"] = json!("query");
            response["query_facts"] = json!(pending);
            response["message"] = json!("Confirmation needed for the listed facts");
        }
    }

    Ok(Json(response))
}
