//! Choose which rule set applies to a frame.

use posture_models::{AnalysisType, JointId, LandmarkSet, PostureType};

use crate::error::EngineResult;
use crate::geometry::exceeds;

/// How far (normalized units) the left knee must sit below the left hip for
/// an `auto` frame to count as a squat.
pub const SQUAT_KNEE_DROP: f64 = 0.1;

/// Resolve the posture type for a frame.
///
/// Explicit hints win. For `auto`, the frame is a squat when the left knee
/// is more than [`SQUAT_KNEE_DROP`] below the left hip, otherwise sitting.
pub fn classify(landmarks: &LandmarkSet, hint: AnalysisType) -> EngineResult<PostureType> {
    if let Some(forced) = hint.forced() {
        return Ok(forced);
    }

    let knee = landmarks.require(JointId::LeftKnee)?;
    let hip = landmarks.require(JointId::LeftHip)?;

    if exceeds(knee.y, hip.y + SQUAT_KNEE_DROP) {
        Ok(PostureType::Squat)
    } else {
        Ok(PostureType::Sitting)
    }
}
