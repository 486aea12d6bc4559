//! Rule administration endpoints.
//!
//! The rule list is the unit of change: every mutation rewrites the whole
//! persisted list and reloads the engine of every live session, since rule
//! ids are positional and a partial update would leave stale indices
//! behind. Reads are public; mutations require the admin role.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::application::api::{ApiError, AppState, authorize_admin};
use crate::domain::models::{Rule, default_rules};

#[derive(Debug, Deserialize)]
pub struct RuleRequest {
    #[serde(default)]
    pub premises: Vec<String>,
    #[serde(default)]
    pub conclusion: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchRuleRequest {
    #[serde(default)]
    pub rules: Vec<RuleRequest>,
}

/// Rules with their positional ids, as every rule-bearing response
/// renders them.
pub fn numbered_rules(rules: &[Rule]) -> Vec<Value> {
    rules
        .iter()
        .enumerate()
        .map(|(id, rule)| {
            json!({
                "id": id,
                "premises": rule.premises,
                "conclusion": rule.conclusion,
            })
        })
        .collect()
}

/// GET /api/rules
pub async fn list_rules(State(state): State<AppState>) -> Json<Value> {
    let rules = state.storage.load_rules();
    Json(json!({ "rules": numbered_rules(&rules) }))
}

/// POST /api/rules
pub async fn add_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RuleRequest>,
) -> Result<Json<Value>, ApiError> {
    authorize_admin(&state, &headers).await?;
    if request.premises.is_empty() || request.conclusion.is_empty() {
        return Err(ApiError::BadRequest(
            "Premises and conclusion must not be empty".to_string(),
        ));
    }

    let mut rules = state.storage.load_rules();
    rules.push(Rule {
        premises: request.premises,
        conclusion: request.conclusion,
    });
    state.storage.save_rules(&rules)?;
    state.sessions.reload_all(&rules).await;

    Ok(Json(json!({
        "message": "Rule added",
        "id": rules.len() - 1,
    })))
}

/// POST /api/rules/batch
pub async fn batch_add_rules(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BatchRuleRequest>,
) -> Result<Json<Value>, ApiError> {
    authorize_admin(&state, &headers).await?;
    if request.rules.is_empty() {
        return Err(ApiError::BadRequest(
            "Rule list must not be empty".to_string(),
        ));
    }

    let mut rules = state.storage.load_rules();
    let mut added = 0;
    for rule in request.rules {
        if !rule.premises.is_empty() && !rule.conclusion.is_empty() {
            rules.push(Rule {
                premises: rule.premises,
                conclusion: rule.conclusion,
            });
            added += 1;
        }
    }
    state.storage.save_rules(&rules)?;
    state.sessions.reload_all(&rules).await;
    info!(added, "rules batch-added");

    Ok(Json(json!({
        "message": format!("Added {added} rules"),
        "added": added,
    })))
}

/// PUT /api/rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(rule_id): Path<usize>,
    Json(request): Json<RuleRequest>,
) -> Result<Json<Value>, ApiError> {
    authorize_admin(&state, &headers).await?;
    if request.premises.is_empty() || request.conclusion.is_empty() {
        return Err(ApiError::BadRequest(
            "Premises and conclusion must not be empty".to_string(),
        ));
    }

    let mut rules = state.storage.load_rules();
    if rule_id >= rules.len() {
        return Err(ApiError::NotFound("Rule does not exist".to_string()));
    }
    rules[rule_id] = Rule {
        premises: request.premises,
        conclusion: request.conclusion,
    };
    state.storage.save_rules(&rules)?;
    state.sessions.reload_all(&rules).await;

    Ok(Json(json!({ "message": "Rule updated" })))
}

/// DELETE /api/rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(rule_id): Path<usize>,
) -> Result<Json<Value>, ApiError> {
    authorize_admin(&state, &headers).await?;

    let mut rules = state.storage.load_rules();
    if rule_id >= rules.len() {
        return Err(ApiError::NotFound("Rule does not exist".to_string()));
    }
    rules.remove(rule_id);
    state.storage.save_rules(&rules)?;
    state.sessions.reload_all(&rules).await;

    Ok(Json(json!({ "message": "Rule deleted" })))
}

/// POST /api/rules/reset
pub async fn reset_rules(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize_admin(&state, &headers).await?;

    let rules = default_rules();
    state.storage.save_rules(&rules)?;
    state.sessions.reload_all(&rules).await;
    info!("rule set restored to defaults");

    Ok(Json(json!({ "message": "Rules reset to defaults" })))
}
