//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use posture_models::AnalysisResult;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "posture_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "posture_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "posture_http_requests_in_flight";

    // Analysis metrics
    pub const FRAMES_ANALYZED_TOTAL: &str = "posture_frames_analyzed_total";
    pub const FRAMES_NO_POSE_TOTAL: &str = "posture_frames_no_pose_total";
    pub const FRAMES_FAILED_TOTAL: &str = "posture_frames_failed_total";
    pub const ISSUES_DETECTED_TOTAL: &str = "posture_issues_detected_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "posture_analysis_duration_seconds";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "posture_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record the outcome of one analyzed frame.
pub fn record_frame(result: &AnalysisResult) {
    if result.is_failure() {
        counter!(names::FRAMES_FAILED_TOTAL).increment(1);
        return;
    }

    match result.posture_type {
        Some(posture) => {
            let labels = [("posture_type", posture.as_str().to_string())];
            counter!(names::FRAMES_ANALYZED_TOTAL, &labels).increment(1);
        }
        None => counter!(names::FRAMES_NO_POSE_TOTAL).increment(1),
    }

    for issue in &result.issues {
        let labels = [
            ("type", issue.issue_type.as_str().to_string()),
            ("severity", issue.severity.as_str().to_string()),
        ];
        counter!(names::ISSUES_DETECTED_TOTAL, &labels).increment(1);
    }
}

/// Record wall time spent analyzing a request's frames.
pub fn record_analysis_duration(endpoint: &str, duration_secs: f64) {
    let labels = [("endpoint", endpoint.to_string())];
    histogram!(names::ANALYSIS_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Metrics middleware for HTTP requests.
///
/// Labels use the matched route template so unknown paths collapse into one
/// series.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
