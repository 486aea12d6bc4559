//! Health check endpoints for monitoring and system status.

use axum::response::Json;

/// Health check endpoint
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "expert_engine",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Root endpoint - provides server information
pub async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Expert System Server",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Production-rule expert system with forward and backward chaining",
        "endpoints": {
            "auth": "/api/auth",
            "rules": "/api/rules",
            "facts": "/api/facts",
            "inference": "/api/inference",
            "history": "/api/history",
            "admin": "/api/admin",
            "health": "/health"
        },
        "session_isolation": true,
    }))
}
