//! BlazePose landmark model via ONNX Runtime.
//!
//! The full-body landmark model takes a square RGB crop in `[0, 1]` and
//! returns 39 landmarks (33 body + 6 auxiliary) in input-pixel units, plus
//! a pose-presence logit. The frame is letterboxed to the input size and
//! landmark coordinates are mapped back to the original frame before being
//! normalized.
//!
//! Execution provider selection:
//! - CUDA on Linux with NVIDIA GPU (when `cuda` feature enabled)
//! - CoreML on macOS
//! - CPU fallback on all platforms

use std::path::Path;
use std::sync::Mutex;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use posture_models::{JointId, Landmark, LandmarkSet};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::pose::PoseSource;

/// Values per landmark in the model output: x, y, z, visibility, presence.
const LANDMARK_STRIDE: usize = 5;

/// Fill value for letterbox padding.
const PAD_VALUE: u8 = 0;

/// Configuration for the ONNX pose source.
#[derive(Debug, Clone)]
pub struct OnnxPoseConfig {
    /// Path to ONNX model file
    pub model_path: String,
    /// Minimum pose presence score
    pub min_detection_confidence: f32,
    /// Input image size (model expects square input)
    pub input_size: u32,
    /// Output holding the landmark tensor
    pub landmarks_output: String,
    /// Output holding the pose-presence logit
    pub presence_output: String,
}

impl Default for OnnxPoseConfig {
    fn default() -> Self {
        Self {
            model_path: "models/pose/pose_landmark_full.onnx".to_string(),
            min_detection_confidence: 0.5,
            input_size: 256,
            landmarks_output: "Identity".to_string(),
            presence_output: "Identity_1".to_string(),
        }
    }
}

/// Placement of the original frame inside the square model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f64,
    pub pad_x: f64,
    pub pad_y: f64,
    pub width: u32,
    pub height: u32,
}

impl Letterbox {
    pub fn new(width: u32, height: u32, input_size: u32) -> Self {
        let size = input_size as f64;
        let scale = (size / width.max(1) as f64).min(size / height.max(1) as f64);
        let scaled_w = (width as f64 * scale).round();
        let scaled_h = (height as f64 * scale).round();
        Self {
            scale,
            pad_x: ((size - scaled_w) / 2.0).floor(),
            pad_y: ((size - scaled_h) / 2.0).floor(),
            width,
            height,
        }
    }

    /// Map a model-input pixel coordinate to normalized frame coordinates.
    pub fn to_normalized(&self, x: f64, y: f64) -> (f64, f64) {
        let fx = (x - self.pad_x) / self.scale;
        let fy = (y - self.pad_y) / self.scale;
        (fx / self.width.max(1) as f64, fy / self.height.max(1) as f64)
    }
}

/// Pose source backed by the BlazePose landmark model.
pub struct OnnxPoseSource {
    session: Mutex<Session>,
    config: OnnxPoseConfig,
}

impl OnnxPoseSource {
    /// Load the model.
    ///
    /// Returns error if model file doesn't exist or cannot be loaded.
    pub fn new(config: OnnxPoseConfig) -> EngineResult<Self> {
        let model_path = Path::new(&config.model_path);
        if !model_path.exists() {
            return Err(EngineError::model_not_found(&config.model_path));
        }

        let session = Mutex::new(create_session(model_path)?);
        info!(
            model_path = %config.model_path,
            input_size = config.input_size,
            "Pose landmark model initialized"
        );

        Ok(Self { session, config })
    }

    pub fn config(&self) -> &OnnxPoseConfig {
        &self.config
    }

    /// Letterbox the frame into an NHWC `[1, S, S, 3]` tensor.
    fn preprocess(&self, image: &DynamicImage) -> EngineResult<(Value, Letterbox)> {
        let size = self.config.input_size;
        let letterbox = Letterbox::new(image.width(), image.height(), size);

        let scaled_w = ((image.width() as f64 * letterbox.scale).round() as u32).clamp(1, size);
        let scaled_h = ((image.height() as f64 * letterbox.scale).round() as u32).clamp(1, size);
        let resized = imageops::resize(&image.to_rgb8(), scaled_w, scaled_h, FilterType::Triangle);

        let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));
        imageops::replace(
            &mut canvas,
            &resized,
            letterbox.pad_x as i64,
            letterbox.pad_y as i64,
        );

        let data: Vec<f32> = canvas.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        let shape = vec![1usize, size as usize, size as usize, 3];
        let tensor = Tensor::from_array((shape, data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| EngineError::internal(format!("Failed to create tensor: {}", e)))?;

        Ok((tensor, letterbox))
    }

    /// Run inference, returning (landmarks, presence logit).
    fn run_inference(&self, input: Value) -> EngineResult<(Vec<f32>, f32)> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| EngineError::internal("Session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| EngineError::pose_estimation(format!("ONNX inference failed: {}", e)))?;

        let landmarks = outputs
            .get(self.config.landmarks_output.as_str())
            .ok_or_else(|| {
                EngineError::pose_estimation(format!(
                    "Missing {} tensor",
                    self.config.landmarks_output
                ))
            })?
            .try_extract_tensor::<f32>()
            .map_err(|e| EngineError::pose_estimation(format!("Failed to extract landmarks: {}", e)))?
            .1
            .to_vec();

        let presence = outputs
            .get(self.config.presence_output.as_str())
            .ok_or_else(|| {
                EngineError::pose_estimation(format!(
                    "Missing {} tensor",
                    self.config.presence_output
                ))
            })?
            .try_extract_tensor::<f32>()
            .map_err(|e| EngineError::pose_estimation(format!("Failed to extract presence: {}", e)))?
            .1
            .first()
            .copied()
            .ok_or_else(|| EngineError::pose_estimation("Empty presence tensor"))?;

        Ok((landmarks, presence))
    }
}

impl PoseSource for OnnxPoseSource {
    fn estimate(&self, image: &DynamicImage) -> EngineResult<Option<LandmarkSet>> {
        let (input, letterbox) = self.preprocess(image)?;
        let (raw, presence_logit) = self.run_inference(input)?;

        let presence = sigmoid(presence_logit);
        if presence < self.config.min_detection_confidence {
            debug!(presence, "No pose above detection threshold");
            return Ok(None);
        }

        let landmarks = decode_landmarks(&raw, &letterbox)?;
        debug!(presence, "Pose detected");
        Ok(Some(landmarks))
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}

/// Turn the flat model output into 33 normalized body landmarks.
///
/// Auxiliary landmarks past the body set are ignored.
pub fn decode_landmarks(raw: &[f32], letterbox: &Letterbox) -> EngineResult<LandmarkSet> {
    let needed = JointId::COUNT * LANDMARK_STRIDE;
    if raw.len() < needed {
        return Err(EngineError::pose_estimation(format!(
            "Unexpected landmark output size: expected at least {}, got {}",
            needed,
            raw.len()
        )));
    }

    // z shares the x scale in the model's output
    let z_scale = letterbox.scale * letterbox.width.max(1) as f64;

    Ok(LandmarkSet::from_fn(|joint| {
        let base = joint.index() * LANDMARK_STRIDE;
        let (x, y) = letterbox.to_normalized(raw[base] as f64, raw[base + 1] as f64);
        Landmark::new(
            x,
            y,
            raw[base + 2] as f64 / z_scale,
            sigmoid(raw[base + 3]) as f64,
        )
    }))
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Create ONNX Runtime session with automatic execution provider selection.
fn create_session(model_path: &Path) -> EngineResult<Session> {
    let model_bytes = std::fs::read(model_path)
        .map_err(|e| EngineError::internal(format!("Failed to read model file: {}", e)))?;

    let builder = Session::builder()
        .map_err(|e| EngineError::internal(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| EngineError::internal(format!("Failed to set optimization level: {}", e)))?;

    #[cfg(all(target_os = "linux", feature = "cuda"))]
    {
        use ort::execution_providers::CUDAExecutionProvider;
        if let Ok(cuda_builder) = builder
            .clone()
            .with_execution_providers([CUDAExecutionProvider::default().build()])
        {
            if let Ok(session) = cuda_builder.commit_from_memory(&model_bytes) {
                info!("Using CUDA execution provider for pose estimation");
                return Ok(session);
            }
        }
        debug!("CUDA execution provider not available, trying alternatives");
    }

    #[cfg(target_os = "macos")]
    {
        use ort::execution_providers::CoreMLExecutionProvider;
        if let Ok(coreml_builder) = builder
            .clone()
            .with_execution_providers([CoreMLExecutionProvider::default().build()])
        {
            if let Ok(session) = coreml_builder.commit_from_memory(&model_bytes) {
                info!("Using CoreML execution provider for pose estimation");
                return Ok(session);
            }
        }
        debug!("CoreML execution provider not available, using CPU");
    }

    info!("Using CPU execution provider for pose estimation");
    builder
        .commit_from_memory(&model_bytes)
        .map_err(|e| EngineError::internal(format!("Failed to load ONNX model: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_landscape() {
        let lb = Letterbox::new(640, 480, 256);
        assert!((lb.scale - 0.4).abs() < 1e-9);
        assert_eq!(lb.pad_x, 0.0);
        assert_eq!(lb.pad_y, 32.0);

        // Center of the input is the center of the frame
        let (x, y) = lb.to_normalized(128.0, 128.0);
        assert!((x - 0.5).abs() < 1e-9);
        assert!((y - 0.5).abs() < 1e-9);

        // Top edge of the scaled image is y = 0 in the frame
        let (_, top) = lb.to_normalized(0.0, 32.0);
        assert!(top.abs() < 1e-9);
    }

    #[test]
    fn test_letterbox_portrait() {
        let lb = Letterbox::new(480, 640, 256);
        assert_eq!(lb.pad_x, 32.0);
        assert_eq!(lb.pad_y, 0.0);
        let (x, _) = lb.to_normalized(224.0, 0.0);
        assert!((x - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_decode_maps_back_to_frame() {
        let lb = Letterbox::new(256, 256, 256);
        let mut raw = vec![0.0f32; 39 * LANDMARK_STRIDE];
        let nose = JointId::Nose.index() * LANDMARK_STRIDE;
        raw[nose] = 64.0;
        raw[nose + 1] = 192.0;
        raw[nose + 3] = 10.0;

        let set = decode_landmarks(&raw, &lb).unwrap();
        assert_eq!(set.len(), JointId::COUNT);
        let n = set.get(JointId::Nose).unwrap();
        assert!((n.x - 0.25).abs() < 1e-9);
        assert!((n.y - 0.75).abs() < 1e-9);
        assert!(n.visibility > 0.99);

        // Zero logit maps to 0.5 visibility
        let ankle = set.get(JointId::LeftAnkle).unwrap();
        assert!((ankle.visibility - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_decode_rejects_short_output() {
        let lb = Letterbox::new(256, 256, 256);
        assert!(decode_landmarks(&[0.0; 10], &lb).is_err());
    }

    #[test]
    fn test_missing_model_is_reported() {
        let result = OnnxPoseSource::new(OnnxPoseConfig {
            model_path: "/nonexistent/pose.onnx".to_string(),
            ..OnnxPoseConfig::default()
        });
        assert!(matches!(result, Err(EngineError::ModelNotFound(_))));
    }

    #[test]
    fn test_corrupt_model_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pose.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();

        let result = OnnxPoseSource::new(OnnxPoseConfig {
            model_path: path.to_string_lossy().into_owned(),
            ..OnnxPoseConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(8.0) > 0.99);
        assert!(sigmoid(-8.0) < 0.01);
    }
}
