//! Posture issues flagged by the rule evaluator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of posture defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// Knee travels past the toes during a squat
    KneeOverToe,
    /// Torso tilts too far forward during a squat
    ForwardLean,
    /// Head sits in front of the shoulders while seated
    ForwardHead,
    /// Neck flexed away from the hip-shoulder line
    NeckBend,
    /// Rounded back while seated
    Slouching,
    /// Back angle out of range.
    ///
    /// Wire-only: kept so results produced by older demo servers still
    /// deserialize. No rule in this workspace emits it.
    BackAngle,
    /// Forward head carriage. Wire-only, like [`IssueType::BackAngle`].
    ForwardHeadPosture,
}

impl IssueType {
    pub const ALL: &'static [IssueType] = &[
        IssueType::KneeOverToe,
        IssueType::ForwardLean,
        IssueType::ForwardHead,
        IssueType::NeckBend,
        IssueType::Slouching,
        IssueType::BackAngle,
        IssueType::ForwardHeadPosture,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::KneeOverToe => "knee_over_toe",
            IssueType::ForwardLean => "forward_lean",
            IssueType::ForwardHead => "forward_head",
            IssueType::NeckBend => "neck_bend",
            IssueType::Slouching => "slouching",
            IssueType::BackAngle => "back_angle",
            IssueType::ForwardHeadPosture => "forward_head_posture",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Moderate,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Moderate => "moderate",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anatomical region an issue refers to.
///
/// Neck and spine are not landmarks themselves; renderers anchor them on the
/// nose and the shoulder midpoint respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    LeftKnee,
    RightKnee,
    Neck,
    Spine,
}

impl BodyRegion {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyRegion::LeftKnee => "left_knee",
            BodyRegion::RightKnee => "right_knee",
            BodyRegion::Neck => "neck",
            BodyRegion::Spine => "spine",
        }
    }
}

/// A detected posture defect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    /// Fixed per-rule confidence in [0, 1]
    pub confidence: f64,
    pub description: String,
    pub joint: BodyRegion,
}

impl Issue {
    pub fn new(
        issue_type: IssueType,
        severity: Severity,
        confidence: f64,
        description: impl Into<String>,
        joint: BodyRegion,
    ) -> Self {
        Self {
            issue_type,
            severity,
            confidence,
            description: description.into(),
            joint,
        }
    }
}
