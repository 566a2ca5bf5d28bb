//! API configuration.

use std::str::FromStr;

use posture_engine::{
    AnalyzerSettings, MockConfig, OverlayOptions, PoseBackend, PoseSourceConfig, ScoringScheme,
};
use tracing::warn;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second (per client IP, `/api` routes only)
    pub rate_limit_rps: u32,
    /// Key rate limits on `X-Forwarded-For` (only behind a trusted proxy)
    pub trust_forwarded_for: bool,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Which pose source to build
    pub pose_backend: PoseBackend,
    /// BlazePose landmark model
    pub pose_model_path: String,
    /// Pose presence threshold
    pub pose_min_confidence: f32,
    /// Deduction table
    pub scoring_scheme: ScoringScheme,
    /// Render overlays for image analyses
    pub overlay_enabled: bool,
    pub overlay_jpeg_quality: u8,
    /// Fixed seed for the mock source
    pub mock_seed: Option<u64>,
    /// Probability that the mock source yields a pose
    pub mock_detection_rate: f64,
    /// Analyze video frames on the rayon pool
    pub batch_parallel: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 30,
            trust_forwarded_for: false,
            max_body_size: 20 * 1024 * 1024, // 20MB
            environment: "development".to_string(),
            pose_backend: PoseBackend::Auto,
            pose_model_path: "models/pose/pose_landmark_full.onnx".to_string(),
            pose_min_confidence: 0.5,
            scoring_scheme: ScoringScheme::Standard,
            overlay_enabled: true,
            overlay_jpeg_quality: 80,
            mock_seed: None,
            mock_detection_rate: 0.9,
            batch_parallel: false,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: env_parse("API_PORT")
                .or_else(|| env_parse("PORT"))
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: env_parse("RATE_LIMIT_RPS").unwrap_or(defaults.rate_limit_rps),
            trust_forwarded_for: env_flag("TRUST_FORWARDED_FOR").unwrap_or(defaults.trust_forwarded_for),
            max_body_size: env_parse("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            pose_backend: env_parse("POSE_BACKEND").unwrap_or(defaults.pose_backend),
            pose_model_path: std::env::var("POSE_MODEL_PATH").unwrap_or(defaults.pose_model_path),
            pose_min_confidence: env_parse("POSE_MIN_CONFIDENCE").unwrap_or(defaults.pose_min_confidence),
            scoring_scheme: env_parse("SCORING_SCHEME").unwrap_or(defaults.scoring_scheme),
            overlay_enabled: env_flag("OVERLAY_ENABLED").unwrap_or(defaults.overlay_enabled),
            overlay_jpeg_quality: env_parse("OVERLAY_JPEG_QUALITY").unwrap_or(defaults.overlay_jpeg_quality),
            mock_seed: env_parse("MOCK_SEED"),
            mock_detection_rate: env_parse("MOCK_DETECTION_RATE").unwrap_or(defaults.mock_detection_rate),
            batch_parallel: env_flag("BATCH_PARALLEL").unwrap_or(defaults.batch_parallel),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    pub fn pose_source_config(&self) -> PoseSourceConfig {
        PoseSourceConfig {
            backend: self.pose_backend,
            model_path: self.pose_model_path.clone(),
            min_detection_confidence: self.pose_min_confidence,
            mock: MockConfig {
                seed: self.mock_seed,
                detection_rate: self.mock_detection_rate,
                ..MockConfig::default()
            },
        }
    }

    pub fn analyzer_settings(&self) -> AnalyzerSettings {
        AnalyzerSettings {
            scoring: self.scoring_scheme.table(),
            overlay: OverlayOptions {
                enabled: self.overlay_enabled,
                jpeg_quality: self.overlay_jpeg_quality,
            },
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment variable");
            None
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
}
