//! Per-frame analysis types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::issue::Issue;
use crate::landmark::LandmarkSet;

/// Score reported when nothing was deducted.
pub const PERFECT_SCORE: u8 = 100;

/// Caller hint selecting which rule set to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// Pick squat or sitting from the detected pose
    #[default]
    Auto,
    Squat,
    Sitting,
}

impl AnalysisType {
    pub const ALL: &'static [AnalysisType] =
        &[AnalysisType::Auto, AnalysisType::Squat, AnalysisType::Sitting];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Auto => "auto",
            AnalysisType::Squat => "squat",
            AnalysisType::Sitting => "sitting",
        }
    }

    /// The rule set forced by this hint, if any.
    pub fn forced(&self) -> Option<PostureType> {
        match self {
            AnalysisType::Auto => None,
            AnalysisType::Squat => Some(PostureType::Squat),
            AnalysisType::Sitting => Some(PostureType::Sitting),
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = AnalysisTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(AnalysisType::Auto),
            "squat" => Ok(AnalysisType::Squat),
            "sitting" | "sit" => Ok(AnalysisType::Sitting),
            _ => Err(AnalysisTypeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown analysis type: {0}")]
pub struct AnalysisTypeParseError(String);

/// The rule set actually applied to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PostureType {
    Squat,
    Sitting,
}

impl PostureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostureType::Squat => "squat",
            PostureType::Sitting => "sitting",
        }
    }
}

impl fmt::Display for PostureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analyzing one frame.
///
/// Always well formed: a frame with no pose, or one whose analysis failed,
/// still produces a result with `pose_detected = false` and safe defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    pub pose_detected: bool,

    /// 33 landmarks when a pose was detected, otherwise empty
    pub landmarks: LandmarkSet,

    pub issues: Vec<Issue>,

    /// 0..=100, higher is better
    pub posture_score: u8,

    /// Deduplicated advice, one entry per issue type
    pub recommendations: Vec<String>,

    /// Joint name -> angle in degrees
    pub joint_angles: BTreeMap<String, f64>,

    /// Annotated frame as a JPEG data URI
    #[serde(default)]
    pub pose_overlay: Option<String>,

    /// Rule set applied to this frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posture_type: Option<PostureType>,

    #[serde(default)]
    pub analysis_timestamp: Option<DateTime<Utc>>,

    /// Caller-supplied frame timestamp (video analysis only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,

    /// Why analysis failed, when it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Result for a frame in which no person was found.
    pub fn no_pose() -> Self {
        Self {
            pose_detected: false,
            landmarks: LandmarkSet::empty(),
            issues: Vec::new(),
            posture_score: PERFECT_SCORE,
            recommendations: Vec::new(),
            joint_angles: BTreeMap::new(),
            pose_overlay: None,
            posture_type: None,
            analysis_timestamp: None,
            timestamp: None,
            error: None,
        }
    }

    /// Result for a frame whose analysis failed.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::no_pose()
        }
    }

    /// Attach the caller's frame timestamp.
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_type_parse() {
        assert_eq!("auto".parse::<AnalysisType>().unwrap(), AnalysisType::Auto);
        assert_eq!("Squat".parse::<AnalysisType>().unwrap(), AnalysisType::Squat);
        assert_eq!("SITTING".parse::<AnalysisType>().unwrap(), AnalysisType::Sitting);
        assert!("standing".parse::<AnalysisType>().is_err());
    }

    #[test]
    fn test_analysis_type_forced() {
        assert_eq!(AnalysisType::Auto.forced(), None);
        assert_eq!(AnalysisType::Squat.forced(), Some(PostureType::Squat));
        assert_eq!(AnalysisType::default(), AnalysisType::Auto);
    }

    #[test]
    fn test_no_pose_defaults() {
        let result = AnalysisResult::no_pose();
        assert!(!result.pose_detected);
        assert!(result.landmarks.is_empty());
        assert_eq!(result.posture_score, 100);
        assert!(result.recommendations.is_empty());
        assert!(!result.is_failure());
    }

    #[test]
    fn test_failed_result_wire_format() {
        let result = AnalysisResult::failed("pose source crashed").with_timestamp(1.5);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["pose_detected"], false);
        assert_eq!(value["landmarks"], serde_json::json!([]));
        assert_eq!(value["pose_overlay"], serde_json::Value::Null);
        assert_eq!(value["error"], "pose source crashed");
        assert_eq!(value["timestamp"], 1.5);
        assert!(value.get("posture_type").is_none());
    }

    #[test]
    fn test_schema_generation() {
        let schema = schemars::schema_for!(AnalysisResult);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("posture_score"));
        assert!(json.contains("LandmarkSet"));
    }
}
