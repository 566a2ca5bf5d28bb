//! Per-frame analysis pipeline.
//!
//! ```text
//! image -> pose source -> classify -> rules -> score -> advice -> angles
//!                                                  \-> overlay (optional)
//! ```
//!
//! Every outcome is folded into an [`AnalysisResult`]; callers never see an
//! analysis error, only `pose_detected = false` with `error` set.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use image::DynamicImage;
use posture_models::{AnalysisResult, AnalysisType, JointId, LandmarkSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::classify;
use crate::codec::encode_jpeg_data_uri;
use crate::error::EngineResult;
use crate::geometry::angle_or_neutral;
use crate::overlay::{render_overlay, OverlayOptions};
use crate::pose::PoseSource;
use crate::recommendations::recommend;
use crate::rules::evaluate;
use crate::scoring::DeductionTable;

/// Joint angles reported for a detected pose: name, then the three joints
/// whose middle one is the vertex.
const REPORTED_ANGLES: [(&str, [JointId; 3]); 4] = [
    ("left_knee", [JointId::LeftHip, JointId::LeftKnee, JointId::LeftAnkle]),
    ("right_knee", [JointId::RightHip, JointId::RightKnee, JointId::RightAnkle]),
    ("left_hip", [JointId::LeftShoulder, JointId::LeftHip, JointId::LeftKnee]),
    ("right_hip", [JointId::RightShoulder, JointId::RightHip, JointId::RightKnee]),
];

/// Analyzer settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerSettings {
    pub scoring: DeductionTable,
    pub overlay: OverlayOptions,
}

/// Runs the full posture pipeline over frames or landmark sets.
///
/// Stateless apart from the pose source, so one instance is shared across
/// requests.
pub struct PostureAnalyzer {
    source: Arc<dyn PoseSource>,
    settings: AnalyzerSettings,
}

impl PostureAnalyzer {
    pub fn new(source: Arc<dyn PoseSource>, settings: AnalyzerSettings) -> Self {
        Self { source, settings }
    }

    pub fn source(&self) -> &Arc<dyn PoseSource> {
        &self.source
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Analyze an already-extracted pose.
    ///
    /// An empty set is a frame without a person and scores 100.
    pub fn analyze_landmarks(&self, landmarks: &LandmarkSet, hint: AnalysisType) -> AnalysisResult {
        if landmarks.is_empty() {
            return stamped(AnalysisResult::no_pose());
        }

        match self.evaluate_pose(landmarks, hint) {
            Ok(result) => stamped(result),
            Err(e) => {
                warn!(error = %e, "Posture evaluation failed");
                stamped(AnalysisResult::failed(e.to_string()))
            }
        }
    }

    /// Estimate the pose in `image` and analyze it.
    pub fn analyze_image(&self, image: &DynamicImage, hint: AnalysisType) -> AnalysisResult {
        let start = Instant::now();

        let landmarks = match self.source.estimate(image) {
            Ok(Some(landmarks)) => landmarks,
            Ok(None) => {
                debug!(source = self.source.name(), "No pose detected");
                return stamped(AnalysisResult::no_pose());
            }
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "Pose estimation failed");
                return stamped(AnalysisResult::failed(e.to_string()));
            }
        };

        let mut result = self.analyze_landmarks(&landmarks, hint);

        if self.settings.overlay.enabled && result.pose_detected {
            let overlay = render_overlay(image, &result.landmarks, &result.issues);
            match encode_jpeg_data_uri(&overlay, self.settings.overlay.jpeg_quality) {
                Ok(uri) => result.pose_overlay = Some(uri),
                Err(e) => warn!(error = %e, "Failed to encode pose overlay"),
            }
        }

        debug!(
            source = self.source.name(),
            posture_type = ?result.posture_type,
            issues = result.issues.len(),
            score = result.posture_score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Frame analyzed"
        );

        result
    }

    fn evaluate_pose(&self, landmarks: &LandmarkSet, hint: AnalysisType) -> EngineResult<AnalysisResult> {
        let posture = classify(landmarks, hint)?;
        let issues = evaluate(posture, landmarks)?;
        let posture_score = self.settings.scoring.score(&issues);
        let recommendations = recommend(&issues);

        Ok(AnalysisResult {
            pose_detected: true,
            landmarks: landmarks.clone(),
            issues,
            posture_score,
            recommendations,
            joint_angles: joint_angles(landmarks),
            posture_type: Some(posture),
            ..AnalysisResult::no_pose()
        })
    }
}

/// 3-D knee and hip angles for a detected pose.
///
/// Degenerate geometry reports 0°. An empty set yields an empty map.
pub fn joint_angles(landmarks: &LandmarkSet) -> BTreeMap<String, f64> {
    REPORTED_ANGLES
        .iter()
        .filter_map(|(name, [a, b, c])| {
            let a = landmarks.get(*a)?.point3();
            let b = landmarks.get(*b)?.point3();
            let c = landmarks.get(*c)?.point3();
            Some((name.to_string(), angle_or_neutral(a, b, c)))
        })
        .collect()
}

pub(crate) fn stamped(mut result: AnalysisResult) -> AnalysisResult {
    result.analysis_timestamp = Some(Utc::now());
    result
}
