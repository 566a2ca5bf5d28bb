//! Capability report for the mock deployment.

use axum::extract::State;
use axum::Json;
use posture_engine::DeductionTable;
use posture_models::{AnalysisType, IssueType};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub analyzer: String,
    pub mode: String,
    pub supported_analysis_types: Vec<AnalysisType>,
    pub issue_types: Vec<IssueType>,
    pub scoring_scheme: String,
    pub scoring: DeductionTable,
    pub overlay_enabled: bool,
    pub detection_rate: f64,
    pub jitter: f64,
    pub frame_count: u64,
}

/// Report what the mock analyzer does and how it is configured.
///
/// Only served when the mock pose source is active.
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    let source = state.source();
    let Some(mock) = source.mock_config() else {
        return Err(ApiError::not_found("Status is only available in mock mode"));
    };
    let settings = state.analyzer.settings();

    Ok(Json(StatusResponse {
        analyzer: source.name().to_string(),
        mode: "mock".to_string(),
        supported_analysis_types: AnalysisType::ALL.to_vec(),
        issue_types: IssueType::ALL.to_vec(),
        scoring_scheme: state.config.scoring_scheme.to_string(),
        scoring: settings.scoring,
        overlay_enabled: settings.overlay.enabled,
        detection_rate: mock.detection_rate,
        jitter: mock.jitter,
        frame_count: source.frames_processed().unwrap_or(0),
    }))
}
