use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;
use crate::state::AppState;

// health handler
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "models": [state.sentiment.name(), state.penguin.name()],
        "rate_limit": {
            "limit": state.limiter.limit(),
            "window_secs": state.limiter.window().as_secs(),
        }
    }))
}
