//! Multi-frame analysis for video requests.

use image::DynamicImage;
use posture_models::{AnalysisResult, AnalysisType, VideoAnalysisResponse, PERFECT_SCORE};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::analyzer::{stamped, PostureAnalyzer};
use crate::codec::CodecError;

/// A frame of a batch, decoded or not.
#[derive(Debug)]
pub struct BatchFrame {
    pub image: Result<DynamicImage, CodecError>,
    /// Seconds from the start of the clip
    pub timestamp: f64,
}

impl BatchFrame {
    pub fn new(image: Result<DynamicImage, CodecError>, timestamp: f64) -> Self {
        Self { image, timestamp }
    }
}

/// Analyze every frame, one result per frame in input order.
///
/// A frame that failed to decode gets a failed result; the rest of the
/// batch is unaffected.
pub fn analyze_batch(
    analyzer: &PostureAnalyzer,
    frames: &[BatchFrame],
    hint: AnalysisType,
    parallel: bool,
) -> Vec<AnalysisResult> {
    debug!(frames = frames.len(), parallel, "Analyzing frame batch");

    let analyze = |(index, frame): (usize, &BatchFrame)| {
        let result = match &frame.image {
            Ok(image) => analyzer.analyze_image(image, hint),
            Err(e) => {
                warn!(frame = index, error = %e, "Skipping undecodable frame");
                stamped(AnalysisResult::failed(e.to_string()))
            }
        };
        result.with_timestamp(frame.timestamp)
    };

    if parallel {
        frames.par_iter().enumerate().map(analyze).collect()
    } else {
        frames.iter().enumerate().map(analyze).collect()
    }
}

/// Roll per-frame results up into the video response.
pub fn summarize(frame_results: Vec<AnalysisResult>) -> VideoAnalysisResponse {
    let total_frames = frame_results.len();
    let total_issues: usize = frame_results.iter().map(AnalysisResult::issue_count).sum();

    let average_score = if frame_results.is_empty() {
        PERFECT_SCORE as u32
    } else {
        let sum: u32 = frame_results.iter().map(|r| r.posture_score as u32).sum();
        (sum as f64 / total_frames as f64).round() as u32
    };

    VideoAnalysisResponse {
        summary: format!("Analyzed {total_frames} frames with {total_issues} total issues detected"),
        frame_results,
        total_frames,
        total_issues,
        average_score,
    }
}
