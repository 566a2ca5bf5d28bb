//! Randomized pose source for demos and tests.
//!
//! Fabricates a seated or squatting skeleton per frame, perturbed enough
//! that some frames trip the posture rules and some do not. Seeding makes
//! the sequence reproducible.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use image::DynamicImage;
use posture_models::{JointId, Landmark, LandmarkSet, PostureType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::pose::PoseSource;

/// Mock source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockConfig {
    /// Fixed RNG seed; entropy-seeded when `None`
    pub seed: Option<u64>,
    /// Probability that a frame contains a pose (default: 0.9)
    pub detection_rate: f64,
    /// Maximum per-coordinate jitter in normalized units (default: 0.04)
    pub jitter: f64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            seed: None,
            detection_rate: 0.9,
            jitter: 0.04,
        }
    }
}

impl MockConfig {
    /// Clamp the rate into [0, 1] and make jitter non-negative; non-finite
    /// values take their defaults.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let detection_rate = if self.detection_rate.is_finite() {
            self.detection_rate.clamp(0.0, 1.0)
        } else {
            defaults.detection_rate
        };
        let jitter = if self.jitter.is_finite() {
            self.jitter.abs()
        } else {
            defaults.jitter
        };

        Self {
            seed: self.seed,
            detection_rate,
            jitter,
        }
    }
}

/// Pose source that invents landmarks.
pub struct MockPoseSource {
    rng: Mutex<StdRng>,
    frames: AtomicU64,
    config: MockConfig,
}

impl MockPoseSource {
    pub fn new(config: MockConfig) -> Self {
        let config = config.normalized();

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            rng: Mutex::new(rng),
            frames: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Generate one frame's landmarks without touching the frame counter.
    pub fn generate(&self) -> EngineResult<Option<LandmarkSet>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| EngineError::internal("Mock RNG lock poisoned"))?;

        if !rng.random_bool(self.config.detection_rate) {
            return Ok(None);
        }

        let posture = if rng.random_bool(0.5) {
            PostureType::Squat
        } else {
            PostureType::Sitting
        };

        Ok(Some(synthesize(posture, &mut *rng, self.config.jitter)))
    }
}

impl PoseSource for MockPoseSource {
    fn estimate(&self, image: &DynamicImage) -> EngineResult<Option<LandmarkSet>> {
        let frame = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
        let landmarks = self.generate()?;
        debug!(
            frame,
            width = image.width(),
            height = image.height(),
            detected = landmarks.is_some(),
            "Mock pose generated"
        );
        Ok(landmarks)
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn frames_processed(&self) -> Option<u64> {
        Some(self.frames.load(Ordering::Relaxed))
    }

    fn is_mock(&self) -> bool {
        true
    }

    fn mock_config(&self) -> Option<&MockConfig> {
        Some(&self.config)
    }
}

/// Build a jittered skeleton for `posture`.
///
/// A per-frame lean shifts the upper body forward and, for squats, a knee
/// drift pushes the knees past the ankles; both are what the rules look at.
pub fn synthesize<R: Rng>(posture: PostureType, rng: &mut R, jitter: f64) -> LandmarkSet {
    let (template, lean, knee_drift) = match posture {
        PostureType::Squat => (
            SQUAT_TEMPLATE,
            rng.random_range(0.0..=0.15),
            rng.random_range(0.0..=0.10),
        ),
        PostureType::Sitting => (SITTING_TEMPLATE, rng.random_range(0.0..=0.12), 0.0),
    };

    LandmarkSet::from_fn(|joint| {
        let (mut x, y) = template[joint.index()];
        if is_upper_body(joint) {
            x += lean;
        }
        if matches!(joint, JointId::LeftKnee | JointId::RightKnee) {
            x += knee_drift;
        }
        Landmark::new(
            (x + rng.random_range(-jitter..=jitter)).clamp(0.0, 1.0),
            (y + rng.random_range(-jitter..=jitter)).clamp(0.0, 1.0),
            rng.random_range(-0.1..=0.1),
            rng.random_range(0.6..=1.0),
        )
    })
}

fn is_upper_body(joint: JointId) -> bool {
    joint.index() <= JointId::RightThumb.index()
}

/// Seated, facing the camera; knees roughly level with the hips.
const SITTING_TEMPLATE: [(f64, f64); JointId::COUNT] = [
    (0.50, 0.25), // nose
    (0.48, 0.23),
    (0.47, 0.23),
    (0.46, 0.23),
    (0.52, 0.23),
    (0.53, 0.23),
    (0.54, 0.23),
    (0.44, 0.24),
    (0.56, 0.24),
    (0.48, 0.28),
    (0.52, 0.28),
    (0.42, 0.40), // left shoulder
    (0.58, 0.40),
    (0.38, 0.53),
    (0.62, 0.53),
    (0.40, 0.64),
    (0.60, 0.64),
    (0.40, 0.66),
    (0.60, 0.66),
    (0.41, 0.66),
    (0.59, 0.66),
    (0.41, 0.65),
    (0.59, 0.65),
    (0.44, 0.65), // left hip
    (0.56, 0.65),
    (0.42, 0.70), // left knee
    (0.58, 0.70),
    (0.42, 0.90), // left ankle
    (0.58, 0.90),
    (0.41, 0.92),
    (0.59, 0.92),
    (0.44, 0.94),
    (0.56, 0.94),
];

/// Mid-squat; knees well below the hips.
const SQUAT_TEMPLATE: [(f64, f64); JointId::COUNT] = [
    (0.50, 0.25), // nose
    (0.48, 0.23),
    (0.47, 0.23),
    (0.46, 0.23),
    (0.52, 0.23),
    (0.53, 0.23),
    (0.54, 0.23),
    (0.44, 0.24),
    (0.56, 0.24),
    (0.48, 0.28),
    (0.52, 0.28),
    (0.43, 0.38), // left shoulder
    (0.57, 0.38),
    (0.40, 0.48),
    (0.60, 0.48),
    (0.45, 0.50),
    (0.55, 0.50),
    (0.45, 0.51),
    (0.55, 0.51),
    (0.46, 0.51),
    (0.54, 0.51),
    (0.46, 0.50),
    (0.54, 0.50),
    (0.45, 0.60), // left hip
    (0.55, 0.60),
    (0.43, 0.76), // left knee
    (0.57, 0.76),
    (0.45, 0.90), // left ankle
    (0.55, 0.90),
    (0.44, 0.92),
    (0.56, 0.92),
    (0.47, 0.94),
    (0.53, 0.94),
];
