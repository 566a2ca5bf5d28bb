//! Error types for posture analysis.

use posture_models::LandmarkError;
use thiserror::Error;

use crate::codec::CodecError;
use crate::geometry::GeometryError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while estimating or evaluating a pose.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Pose estimation failed: {0}")]
    PoseEstimation(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Pose backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Landmark error: {0}")]
    Landmark(#[from] LandmarkError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Image error: {0}")]
    Codec(#[from] CodecError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create a pose estimation failure error.
    pub fn pose_estimation(message: impl Into<String>) -> Self {
        Self::PoseEstimation(message.into())
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create a backend unavailable error.
    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::BackendUnavailable(message.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
