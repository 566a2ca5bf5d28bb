//! Application state.

use std::sync::Arc;

use posture_engine::{build_pose_source, EngineResult, PoseSource, PostureAnalyzer};
use tracing::info;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub analyzer: Arc<PostureAnalyzer>,
}

impl AppState {
    /// Create new application state, building the configured pose source.
    pub fn new(config: ApiConfig) -> EngineResult<Self> {
        let source = build_pose_source(&config.pose_source_config())?;
        info!(
            analyzer = source.name(),
            scoring = %config.scoring_scheme,
            overlay = config.overlay_enabled,
            "Pose source ready"
        );
        Ok(Self::with_source(config, source))
    }

    /// Create state around an existing pose source.
    pub fn with_source(config: ApiConfig, source: Arc<dyn PoseSource>) -> Self {
        let analyzer = PostureAnalyzer::new(source, config.analyzer_settings());
        Self {
            config,
            analyzer: Arc::new(analyzer),
        }
    }

    pub fn source(&self) -> &Arc<dyn PoseSource> {
        self.analyzer.source()
    }
}
