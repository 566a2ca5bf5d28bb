//! HTTP request and response bodies.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::issue::{IssueType, Severity};
use crate::landmark::LandmarkSet;

/// Body of `POST /api/analyze-frame`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeFrameRequest {
    /// Base64 image, usually a `data:image/...;base64,` URI
    #[serde(default)]
    pub image: Option<String>,
    /// `auto`, `squat` or `sitting`
    #[serde(default)]
    pub analysis_type: Option<String>,
}

/// Body of `POST /api/analyze-landmarks`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeLandmarksRequest {
    pub landmarks: LandmarkSet,
    #[serde(default)]
    pub analysis_type: Option<String>,
}

/// One frame of a video analysis request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoFrame {
    pub image: String,
    /// Seconds from the start of the clip
    #[serde(default)]
    pub timestamp: f64,
}

/// Body of `POST /api/analyze-video`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeVideoRequest {
    /// Frames to analyze; omitted means "send the placeholder report"
    #[serde(default)]
    pub frames: Option<Vec<VideoFrame>>,
    #[serde(default)]
    pub analysis_type: Option<String>,
}

/// Aggregated results for a batch of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoAnalysisResponse {
    /// Per-frame results, in request order
    pub frame_results: Vec<AnalysisResult>,
    pub total_frames: usize,
    pub total_issues: usize,
    /// Mean posture score, rounded to the nearest integer
    pub average_score: u32,
    pub summary: String,
}

/// Issue reference inside the placeholder report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IssueBrief {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameIssueSummary {
    pub frame: u32,
    pub issues: Vec<IssueBrief>,
}

/// Fixed report returned by `analyze-video` when no frames are sent.
///
/// Lets clients exercise the endpoint shape without uploading a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaceholderVideoReport {
    pub total_frames: u32,
    pub issues_summary: Vec<FrameIssueSummary>,
    pub overall_score: u8,
}

impl PlaceholderVideoReport {
    pub fn sample() -> Self {
        Self {
            total_frames: 100,
            issues_summary: vec![
                FrameIssueSummary {
                    frame: 15,
                    issues: vec![IssueBrief {
                        issue_type: IssueType::KneeOverToe,
                        severity: Severity::High,
                    }],
                },
                FrameIssueSummary {
                    frame: 32,
                    issues: vec![IssueBrief {
                        issue_type: IssueType::ForwardLean,
                        severity: Severity::Moderate,
                    }],
                },
            ],
            overall_score: 75,
        }
    }
}
