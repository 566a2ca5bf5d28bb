//! Pose sources: anything that turns a frame into a landmark set.
//!
//! | Backend | Source | Notes |
//! |---------|--------|-------|
//! | `onnx` | [`OnnxPoseSource`] | BlazePose landmark model via ONNX Runtime |
//! | `mock` | [`MockPoseSource`] | Randomized landmarks for demos, no model needed |
//! | `auto` | either | ONNX when the model file exists, mock otherwise |
//!
//! The analyzer only sees the [`PoseSource`] trait, so rules, scoring and
//! recommendations behave identically whichever backend is plugged in.

pub mod mock;
#[cfg(feature = "onnx")]
pub mod onnx;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use image::DynamicImage;
use posture_models::LandmarkSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};

pub use mock::{MockConfig, MockPoseSource};
#[cfg(feature = "onnx")]
pub use onnx::{OnnxPoseConfig, OnnxPoseSource};

/// Produces landmarks for a decoded frame.
pub trait PoseSource: Send + Sync {
    /// Estimate the pose in `image`.
    ///
    /// Returns `Ok(None)` when no person is found; errors are reserved for
    /// failures of the source itself.
    fn estimate(&self, image: &DynamicImage) -> EngineResult<Option<LandmarkSet>>;

    /// Source name for logging and health reports.
    fn name(&self) -> &'static str;

    /// Frames seen so far, for sources that keep count.
    fn frames_processed(&self) -> Option<u64> {
        None
    }

    /// Whether landmarks are fabricated rather than measured.
    fn is_mock(&self) -> bool {
        false
    }

    /// Settings in effect, for mock sources.
    fn mock_config(&self) -> Option<&MockConfig> {
        None
    }
}

/// Which pose source to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseBackend {
    #[default]
    Auto,
    Onnx,
    Mock,
}

impl PoseBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoseBackend::Auto => "auto",
            PoseBackend::Onnx => "onnx",
            PoseBackend::Mock => "mock",
        }
    }
}

impl fmt::Display for PoseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoseBackend {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(PoseBackend::Auto),
            "onnx" | "model" => Ok(PoseBackend::Onnx),
            "mock" | "demo" => Ok(PoseBackend::Mock),
            other => Err(EngineError::invalid_config(format!("unknown pose backend: {other}"))),
        }
    }
}

/// Everything needed to build a pose source.
#[derive(Debug, Clone)]
pub struct PoseSourceConfig {
    pub backend: PoseBackend,
    /// Path to the BlazePose landmark ONNX model
    pub model_path: String,
    /// Minimum pose presence score (default: 0.5)
    pub min_detection_confidence: f32,
    pub mock: MockConfig,
}

impl Default for PoseSourceConfig {
    fn default() -> Self {
        Self {
            backend: PoseBackend::Auto,
            model_path: "models/pose/pose_landmark_full.onnx".to_string(),
            min_detection_confidence: 0.5,
            mock: MockConfig::default(),
        }
    }
}

/// Build the configured pose source.
///
/// `auto` prefers the ONNX model and falls back to the mock when the model
/// file is missing or the crate was built without the `onnx` feature.
pub fn build_pose_source(config: &PoseSourceConfig) -> EngineResult<Arc<dyn PoseSource>> {
    match config.backend {
        PoseBackend::Mock => Ok(Arc::new(MockPoseSource::new(config.mock.clone()))),
        PoseBackend::Onnx => build_onnx(config),
        PoseBackend::Auto => {
            if cfg!(feature = "onnx") && Path::new(&config.model_path).exists() {
                build_onnx(config)
            } else {
                warn!(
                    model_path = %config.model_path,
                    "Pose model unavailable, using mock pose source"
                );
                Ok(Arc::new(MockPoseSource::new(config.mock.clone())))
            }
        }
    }
}

#[cfg(feature = "onnx")]
fn build_onnx(config: &PoseSourceConfig) -> EngineResult<Arc<dyn PoseSource>> {
    let source = OnnxPoseSource::new(OnnxPoseConfig {
        model_path: config.model_path.clone(),
        min_detection_confidence: config.min_detection_confidence,
        ..OnnxPoseConfig::default()
    })?;
    tracing::info!(model_path = %config.model_path, "Using ONNX pose source");
    Ok(Arc::new(source))
}

#[cfg(not(feature = "onnx"))]
fn build_onnx(_config: &PoseSourceConfig) -> EngineResult<Arc<dyn PoseSource>> {
    Err(EngineError::backend_unavailable(
        "built without the `onnx` feature",
    ))
}
