//! Shared data models for the posture analysis service.
//!
//! This crate provides Serde-serializable types for:
//! - Body landmarks and the fixed 33-joint skeleton
//! - Posture issues, severities and body regions
//! - Per-frame analysis results
//! - HTTP request/response payloads

pub mod analysis;
pub mod issue;
pub mod landmark;
pub mod payload;

// Re-export common types
pub use analysis::{AnalysisResult, AnalysisType, AnalysisTypeParseError, PostureType, PERFECT_SCORE};
pub use issue::{BodyRegion, Issue, IssueType, Severity};
pub use landmark::{JointId, Landmark, LandmarkError, LandmarkSet, POSE_CONNECTIONS};
pub use payload::{
    AnalyzeFrameRequest, AnalyzeLandmarksRequest, AnalyzeVideoRequest, FrameIssueSummary,
    IssueBrief, PlaceholderVideoReport, VideoAnalysisResponse, VideoFrame,
};
