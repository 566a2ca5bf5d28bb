//! Fixed-threshold posture rules.
//!
//! Each rule set reads a handful of landmarks, derives a horizontal offset
//! or a vertex angle, and compares it against empirical thresholds. The
//! thresholds are tuned constants; keep them exactly as written.
//!
//! | Rule | Quantity | Flag when | High when | Confidence |
//! |------|----------|-----------|-----------|------------|
//! | knee_over_toe | knee.x − ankle.x | > 0.05 | always | 0.85 |
//! | forward_lean | mean back angle | < 150° | ≤ 120° | 0.75 |
//! | forward_head | nose.x − shoulder.x | > 0.05 | ≥ 0.1 | 0.8 |
//! | neck_bend | hip–shoulder–nose | < 150° | ≤ 120° | 0.75 |
//! | slouching | hip–shoulder–vertical | < 160° | ≤ 140° | 0.7 |

use posture_models::{BodyRegion, Issue, IssueType, JointId, Landmark, LandmarkSet, PostureType, Severity};

use crate::error::EngineResult;
use crate::geometry::{above, angle_or_neutral, at_least, at_most, below, exceeds};

/// Length of the synthetic vertical ray used for back angles.
const VERTICAL_REFERENCE: f64 = 0.1;

// Squat
const KNEE_OVER_TOE_MARGIN: f64 = 0.05;
const KNEE_OVER_TOE_CONFIDENCE: f64 = 0.85;
const FORWARD_LEAN_MAX_ANGLE: f64 = 150.0;
const FORWARD_LEAN_HIGH_ANGLE: f64 = 120.0;
const FORWARD_LEAN_CONFIDENCE: f64 = 0.75;

// Sitting
const FORWARD_HEAD_OFFSET: f64 = 0.05;
const FORWARD_HEAD_HIGH_OFFSET: f64 = 0.1;
const FORWARD_HEAD_CONFIDENCE: f64 = 0.8;
const NECK_BEND_MAX_ANGLE: f64 = 150.0;
const NECK_BEND_HIGH_ANGLE: f64 = 120.0;
const NECK_BEND_CONFIDENCE: f64 = 0.75;
const SLOUCH_MAX_ANGLE: f64 = 160.0;
const SLOUCH_HIGH_ANGLE: f64 = 140.0;
const SLOUCH_CONFIDENCE: f64 = 0.7;

/// Run the rule set for `posture` over a detected pose.
pub fn evaluate(posture: PostureType, landmarks: &LandmarkSet) -> EngineResult<Vec<Issue>> {
    match posture {
        PostureType::Squat => evaluate_squat(landmarks),
        PostureType::Sitting => evaluate_sitting(landmarks),
    }
}

/// Squat rules: knee-over-toe per leg, then forward lean.
pub fn evaluate_squat(landmarks: &LandmarkSet) -> EngineResult<Vec<Issue>> {
    let left_hip = landmarks.require(JointId::LeftHip)?.point2();
    let right_hip = landmarks.require(JointId::RightHip)?.point2();
    let left_knee = landmarks.require(JointId::LeftKnee)?.point2();
    let right_knee = landmarks.require(JointId::RightKnee)?.point2();
    let left_ankle = landmarks.require(JointId::LeftAnkle)?.point2();
    let right_ankle = landmarks.require(JointId::RightAnkle)?.point2();
    let left_shoulder = landmarks.require(JointId::LeftShoulder)?.point2();
    let right_shoulder = landmarks.require(JointId::RightShoulder)?.point2();

    let mut issues = Vec::new();

    if exceeds(left_knee[0], left_ankle[0] + KNEE_OVER_TOE_MARGIN) {
        issues.push(Issue::new(
            IssueType::KneeOverToe,
            Severity::High,
            KNEE_OVER_TOE_CONFIDENCE,
            "Left knee extends beyond toes",
            BodyRegion::LeftKnee,
        ));
    }

    if exceeds(right_knee[0], right_ankle[0] + KNEE_OVER_TOE_MARGIN) {
        issues.push(Issue::new(
            IssueType::KneeOverToe,
            Severity::High,
            KNEE_OVER_TOE_CONFIDENCE,
            "Right knee extends beyond toes",
            BodyRegion::RightKnee,
        ));
    }

    let left_back = angle_or_neutral(left_hip, left_shoulder, above(left_shoulder, VERTICAL_REFERENCE));
    let right_back = angle_or_neutral(right_hip, right_shoulder, above(right_shoulder, VERTICAL_REFERENCE));
    let back_angle = (left_back + right_back) / 2.0;

    if below(back_angle, FORWARD_LEAN_MAX_ANGLE) {
        issues.push(Issue::new(
            IssueType::ForwardLean,
            tiered(at_most(back_angle, FORWARD_LEAN_HIGH_ANGLE)),
            FORWARD_LEAN_CONFIDENCE,
            format!("Forward lean detected (angle: {back_angle:.1}°)"),
            BodyRegion::Spine,
        ));
    }

    Ok(issues)
}

/// Sitting rules: forward head, neck bend, slouching.
pub fn evaluate_sitting(landmarks: &LandmarkSet) -> EngineResult<Vec<Issue>> {
    let nose = landmarks.require(JointId::Nose)?.point2();
    let shoulder = Landmark::midpoint(
        landmarks.require(JointId::LeftShoulder)?,
        landmarks.require(JointId::RightShoulder)?,
    )
    .point2();
    let hip = Landmark::midpoint(
        landmarks.require(JointId::LeftHip)?,
        landmarks.require(JointId::RightHip)?,
    )
    .point2();

    let mut issues = Vec::new();

    let head_forward = nose[0] - shoulder[0];
    if exceeds(head_forward, FORWARD_HEAD_OFFSET) {
        issues.push(Issue::new(
            IssueType::ForwardHead,
            tiered(at_least(head_forward, FORWARD_HEAD_HIGH_OFFSET)),
            FORWARD_HEAD_CONFIDENCE,
            "Forward head posture detected",
            BodyRegion::Neck,
        ));
    }

    let neck_angle = angle_or_neutral(hip, shoulder, nose);
    if below(neck_angle, NECK_BEND_MAX_ANGLE) {
        issues.push(Issue::new(
            IssueType::NeckBend,
            tiered(at_most(neck_angle, NECK_BEND_HIGH_ANGLE)),
            NECK_BEND_CONFIDENCE,
            format!("Excessive neck bending (angle: {neck_angle:.1}°)"),
            BodyRegion::Neck,
        ));
    }

    let back_angle = angle_or_neutral(hip, shoulder, above(shoulder, VERTICAL_REFERENCE));
    if below(back_angle, SLOUCH_MAX_ANGLE) {
        issues.push(Issue::new(
            IssueType::Slouching,
            tiered(at_most(back_angle, SLOUCH_HIGH_ANGLE)),
            SLOUCH_CONFIDENCE,
            format!("Slouching detected (back angle: {back_angle:.1}°)"),
            BodyRegion::Spine,
        ));
    }

    Ok(issues)
}

fn tiered(high: bool) -> Severity {
    if high {
        Severity::High
    } else {
        Severity::Moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Upright figure facing the camera: no rule should fire.
    fn upright() -> LandmarkSet {
        let mut set = LandmarkSet::from_fn(|_| Landmark::xy(0.5, 0.5));
        set.set(JointId::Nose, Landmark::xy(0.5, 0.2));
        set.set(JointId::LeftShoulder, Landmark::xy(0.45, 0.35));
        set.set(JointId::RightShoulder, Landmark::xy(0.55, 0.35));
        set.set(JointId::LeftHip, Landmark::xy(0.45, 0.6));
        set.set(JointId::RightHip, Landmark::xy(0.55, 0.6));
        set.set(JointId::LeftKnee, Landmark::xy(0.45, 0.75));
        set.set(JointId::RightKnee, Landmark::xy(0.55, 0.75));
        set.set(JointId::LeftAnkle, Landmark::xy(0.45, 0.9));
        set.set(JointId::RightAnkle, Landmark::xy(0.55, 0.9));
        set
    }

    #[test]
    fn test_upright_has_no_issues() {
        assert!(evaluate_squat(&upright()).unwrap().is_empty());
        assert!(evaluate_sitting(&upright()).unwrap().is_empty());
    }

    #[test]
    fn test_left_knee_over_toe() {
        let mut set = upright();
        set.set(JointId::LeftKnee, Landmark::xy(0.60, 0.75));
        set.set(JointId::LeftAnkle, Landmark::xy(0.50, 0.9));

        let issues = evaluate_squat(&set).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, IssueType::KneeOverToe);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].confidence, 0.85);
        assert_eq!(issues[0].joint, BodyRegion::LeftKnee);
        assert_eq!(issues[0].description, "Left knee extends beyond toes");
    }

    #[test]
    fn test_knee_exactly_at_margin_is_fine() {
        let mut set = upright();
        set.set(JointId::RightKnee, Landmark::xy(0.60, 0.75));
        set.set(JointId::RightAnkle, Landmark::xy(0.55, 0.9));
        assert!(evaluate_squat(&set).unwrap().is_empty());
    }

    #[test]
    fn test_both_knees_flagged_in_order() {
        let mut set = upright();
        set.set(JointId::LeftKnee, Landmark::xy(0.60, 0.75));
        set.set(JointId::RightKnee, Landmark::xy(0.70, 0.75));

        let issues = evaluate_squat(&set).unwrap();
        let joints: Vec<_> = issues.iter().map(|i| i.joint).collect();
        assert_eq!(joints, vec![BodyRegion::LeftKnee, BodyRegion::RightKnee]);
    }

    #[test]
    fn test_forward_lean_tiers() {
        // Shoulders shifted forward so hip-shoulder-vertical is ~135°
        let mut set = upright();
        set.set(JointId::LeftShoulder, Landmark::xy(0.70, 0.35));
        set.set(JointId::RightShoulder, Landmark::xy(0.80, 0.35));
        let issues = evaluate_squat(&set).unwrap();
        let lean = issues.iter().find(|i| i.issue_type == IssueType::ForwardLean).unwrap();
        assert_eq!(lean.severity, Severity::Moderate);
        assert_eq!(lean.confidence, 0.75);
        assert_eq!(lean.joint, BodyRegion::Spine);
        assert!(lean.description.starts_with("Forward lean detected (angle: 135.0"));

        // Torso almost horizontal: well under 120°
        let mut set = upright();
        set.set(JointId::LeftShoulder, Landmark::xy(0.85, 0.55));
        set.set(JointId::RightShoulder, Landmark::xy(0.95, 0.55));
        let issues = evaluate_squat(&set).unwrap();
        let lean = issues.iter().find(|i| i.issue_type == IssueType::ForwardLean).unwrap();
        assert_eq!(lean.severity, Severity::High);
    }

    #[test]
    fn test_forward_head_high_at_decimal_boundary() {
        let mut set = upright();
        set.set(JointId::LeftShoulder, Landmark::xy(0.60, 0.35));
        set.set(JointId::RightShoulder, Landmark::xy(0.60, 0.35));
        set.set(JointId::LeftHip, Landmark::xy(0.60, 0.6));
        set.set(JointId::RightHip, Landmark::xy(0.60, 0.6));
        set.set(JointId::Nose, Landmark::xy(0.70, 0.2));

        let issues = evaluate_sitting(&set).unwrap();
        assert_eq!(issues[0].issue_type, IssueType::ForwardHead);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].confidence, 0.8);
        assert_eq!(issues[0].joint, BodyRegion::Neck);
    }

    #[test]
    fn test_forward_head_moderate() {
        let mut set = upright();
        set.set(JointId::Nose, Landmark::xy(0.58, 0.2));

        let issues = evaluate_sitting(&set).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, IssueType::ForwardHead);
        assert_eq!(issues[0].severity, Severity::Moderate);
    }

    #[test]
    fn test_neck_bend() {
        // Head dropped forward level with the shoulders: neck angle 90°
        let mut set = upright();
        set.set(JointId::Nose, Landmark::xy(0.5 - 0.15, 0.35));

        let issues = evaluate_sitting(&set).unwrap();
        let neck = issues.iter().find(|i| i.issue_type == IssueType::NeckBend).unwrap();
        assert_eq!(neck.severity, Severity::High);
        assert_eq!(neck.confidence, 0.75);
        assert!(neck.description.contains("90.0"));
        // Nose moved backwards, so no forward head
        assert!(issues.iter().all(|i| i.issue_type != IssueType::ForwardHead));
    }

    #[test]
    fn test_neck_bend_moderate() {
        // Nose up and forward at 45°: neck angle 135°
        let mut set = upright();
        set.set(JointId::Nose, Landmark::xy(0.4, 0.25));

        let issues = evaluate_sitting(&set).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, IssueType::NeckBend);
        assert_eq!(issues[0].severity, Severity::Moderate);
        assert_eq!(issues[0].joint, BodyRegion::Neck);
        assert!(issues[0].description.contains("135.0"));
    }

    #[test]
    fn test_head_exactly_at_offset_is_fine() {
        // 0.55 - 0.50 lands just above 0.05 in binary
        let mut set = upright();
        set.set(JointId::Nose, Landmark::xy(0.55, 0.2));
        assert!(evaluate_sitting(&set).unwrap().is_empty());
    }

    #[test]
    fn test_slouching_tiers() {
        // Shoulders 0.1 ahead of hips over 0.25 rise: ~158° back angle
        let mut set = upright();
        set.set(JointId::LeftShoulder, Landmark::xy(0.55, 0.35));
        set.set(JointId::RightShoulder, Landmark::xy(0.65, 0.35));
        set.set(JointId::Nose, Landmark::xy(0.6, 0.2));
        let issues = evaluate_sitting(&set).unwrap();
        let slouch = issues.iter().find(|i| i.issue_type == IssueType::Slouching).unwrap();
        assert_eq!(slouch.severity, Severity::Moderate);
        assert_eq!(slouch.confidence, 0.7);

        // Shoulders 0.25 ahead over 0.25 rise: 135°
        let mut set = upright();
        set.set(JointId::LeftShoulder, Landmark::xy(0.70, 0.35));
        set.set(JointId::RightShoulder, Landmark::xy(0.80, 0.35));
        set.set(JointId::Nose, Landmark::xy(0.75, 0.2));
        let issues = evaluate_sitting(&set).unwrap();
        let slouch = issues.iter().find(|i| i.issue_type == IssueType::Slouching).unwrap();
        assert_eq!(slouch.severity, Severity::High);
    }

    #[test]
    fn test_empty_set_is_an_error() {
        assert!(evaluate_squat(&LandmarkSet::empty()).is_err());
        assert!(evaluate_sitting(&LandmarkSet::empty()).is_err());
    }

    #[test]
    fn test_degenerate_geometry_uses_neutral_angle() {
        // Hip on top of the shoulder: back angle falls back to 0°, which is
        // reported as a severe lean instead of aborting the evaluation.
        let mut set = upright();
        set.set(JointId::LeftHip, Landmark::xy(0.45, 0.35));
        set.set(JointId::RightHip, Landmark::xy(0.55, 0.35));
        let issues = evaluate_squat(&set).unwrap();
        let lean = issues.iter().find(|i| i.issue_type == IssueType::ForwardLean).unwrap();
        assert_eq!(lean.severity, Severity::High);
        assert!(lean.description.contains("0.0"));
    }
}
