//! Posture analysis handlers.
//!
//! Decoding and analysis are CPU-bound, so each request runs start to
//! finish on a blocking thread.

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use posture_engine::{analyze_batch, decode_data_uri, summarize, BatchFrame};
use posture_models::{
    AnalysisResult, AnalysisType, AnalyzeFrameRequest, AnalyzeLandmarksRequest,
    AnalyzeVideoRequest, PlaceholderVideoReport,
};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Analyze a single base64 frame.
pub async fn analyze_frame(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeFrameRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let Json(request) = payload?;
    let image = request
        .image
        .ok_or_else(|| ApiError::bad_request("No image provided"))?;
    let hint = parse_analysis_type(request.analysis_type.as_deref())?;

    let start = Instant::now();
    let analyzer = state.analyzer.clone();
    let result = tokio::task::spawn_blocking(move || {
        let frame = decode_data_uri(&image)?;
        Ok::<_, ApiError>(analyzer.analyze_image(&frame, hint))
    })
    .await
    .map_err(|e| ApiError::internal(format!("Analysis task failed: {}", e)))??;

    metrics::record_frame(&result);
    metrics::record_analysis_duration("analyze_frame", start.elapsed().as_secs_f64());

    Ok(Json(result))
}

/// Analyze a landmark set supplied by the client.
pub async fn analyze_landmarks(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeLandmarksRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let Json(request) = payload?;
    let hint = parse_analysis_type(request.analysis_type.as_deref())?;

    let analyzer = state.analyzer.clone();
    let result = tokio::task::spawn_blocking(move || analyzer.analyze_landmarks(&request.landmarks, hint))
        .await
        .map_err(|e| ApiError::internal(format!("Analysis task failed: {}", e)))?;

    metrics::record_frame(&result);
    Ok(Json(result))
}

/// Analyze a sequence of frames.
///
/// Without `frames` the fixed placeholder report is returned. Frames that
/// fail to decode become error results in place; they never fail the
/// request.
pub async fn analyze_video(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeVideoRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let hint = parse_analysis_type(request.analysis_type.as_deref())?;

    let Some(frames) = request.frames else {
        debug!("No frames supplied, returning placeholder report");
        return Ok(Json(PlaceholderVideoReport::sample()).into_response());
    };

    let start = Instant::now();
    let analyzer = state.analyzer.clone();
    let parallel = state.config.batch_parallel;
    let frame_count = frames.len();

    let response = tokio::task::spawn_blocking(move || {
        let decoded: Vec<BatchFrame> = frames
            .iter()
            .map(|frame| BatchFrame::new(decode_data_uri(&frame.image), frame.timestamp))
            .collect();
        summarize(analyze_batch(&analyzer, &decoded, hint, parallel))
    })
    .await
    .map_err(|e| ApiError::internal(format!("Analysis task failed: {}", e)))?;

    for result in &response.frame_results {
        metrics::record_frame(result);
    }
    metrics::record_analysis_duration("analyze_video", start.elapsed().as_secs_f64());

    info!(
        frames = frame_count,
        total_issues = response.total_issues,
        average_score = response.average_score,
        duration_ms = start.elapsed().as_millis() as u64,
        "Video analysis completed"
    );

    Ok(Json(response).into_response())
}

fn parse_analysis_type(raw: Option<&str>) -> ApiResult<AnalysisType> {
    Ok(raw.map(str::parse::<AnalysisType>).transpose()?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analysis_type() {
        assert_eq!(parse_analysis_type(None).unwrap(), AnalysisType::Auto);
        assert_eq!(parse_analysis_type(Some("squat")).unwrap(), AnalysisType::Squat);
        assert!(matches!(
            parse_analysis_type(Some("yoga")),
            Err(ApiError::AnalysisType(_))
        ));
    }
}
