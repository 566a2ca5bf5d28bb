#![deny(unreachable_patterns)]
//! Posture analysis engine.
//!
//! This crate provides:
//! - Pose sources behind one trait (BlazePose via ONNX Runtime, or a mock)
//! - Vertex-angle geometry and the squat/sitting classifier
//! - Fixed-threshold posture rules, scoring and recommendations
//! - The per-frame orchestrator and the multi-frame batch runner
//! - Base64 image codec and skeleton overlay rendering

pub mod analyzer;
pub mod batch;
pub mod classifier;
pub mod codec;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod pose;
pub mod recommendations;
pub mod rules;
pub mod scoring;

pub use analyzer::{joint_angles, AnalyzerSettings, PostureAnalyzer};
pub use batch::{analyze_batch, summarize, BatchFrame};
pub use classifier::classify;
pub use codec::{decode_data_uri, encode_jpeg_data_uri, CodecError};
pub use error::{EngineError, EngineResult};
pub use geometry::{angle_at, angle_or_neutral, GeometryError};
pub use overlay::{render_overlay, OverlayOptions};
pub use pose::{build_pose_source, MockConfig, MockPoseSource, PoseBackend, PoseSource, PoseSourceConfig};
#[cfg(feature = "onnx")]
pub use pose::{OnnxPoseConfig, OnnxPoseSource};
pub use recommendations::{advice_for, recommend};
pub use rules::evaluate;
pub use scoring::{DeductionTable, ScoringScheme};
