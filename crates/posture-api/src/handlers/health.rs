//! Health check handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Pose source in use (`onnx` or `mock`)
    pub analyzer: String,
    pub version: String,
    pub timestamp: String,
    /// Frames generated so far (mock source only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<u64>,
}

/// Health check endpoint (liveness probe).
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let source = state.source();
    Json(HealthResponse {
        status: "healthy".to_string(),
        analyzer: source.name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        frame_count: source.frames_processed(),
    })
}
