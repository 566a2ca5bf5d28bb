//! Skeleton overlay drawn over the analyzed frame.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;
use posture_models::{BodyRegion, Issue, JointId, Landmark, LandmarkSet, Severity, POSE_CONNECTIONS};
use serde::{Deserialize, Serialize};

/// Landmarks below this visibility are not connected.
pub const MIN_EDGE_VISIBILITY: f64 = 0.5;

const SKELETON_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const JOINT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const HIGH_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const MODERATE_COLOR: Rgb<u8> = Rgb([255, 165, 0]);
const LOW_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const OK_BAR_COLOR: Rgb<u8> = Rgb([0, 160, 0]);
const ISSUE_BAR_COLOR: Rgb<u8> = Rgb([200, 0, 0]);

/// Overlay rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayOptions {
    /// Render and attach an overlay to image analyses (default: true)
    pub enabled: bool,
    /// JPEG quality for the encoded overlay (default: 80)
    pub jpeg_quality: u8,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            jpeg_quality: 80,
        }
    }
}

/// Draw the pose and its issues over a copy of `frame`.
pub fn render_overlay(frame: &DynamicImage, landmarks: &LandmarkSet, issues: &[Issue]) -> RgbImage {
    let mut canvas = frame.to_rgb8();
    let (width, height) = canvas.dimensions();
    let scale = (width.min(height) as f32 / 240.0).max(1.0);

    if !landmarks.is_empty() {
        for (from, to) in POSE_CONNECTIONS.iter() {
            let (Some(a), Some(b)) = (landmarks.get(*from), landmarks.get(*to)) else {
                continue;
            };
            if a.visibility < MIN_EDGE_VISIBILITY || b.visibility < MIN_EDGE_VISIBILITY {
                continue;
            }
            draw_line_segment_mut(
                &mut canvas,
                to_canvas(a, width, height),
                to_canvas(b, width, height),
                SKELETON_COLOR,
            );
        }

        let dot = (2.0 * scale).round() as i32;
        for (_, lm) in landmarks.iter() {
            let (x, y) = to_canvas(lm, width, height);
            draw_filled_circle_mut(&mut canvas, (x as i32, y as i32), dot, JOINT_COLOR);
        }

        let ring = (10.0 * scale).round() as i32;
        for issue in issues {
            if let Some(anchor) = region_anchor(landmarks, issue.joint) {
                let (x, y) = to_canvas(&anchor, width, height);
                let color = severity_color(issue.severity);
                // Doubled ring for a thicker outline
                draw_hollow_circle_mut(&mut canvas, (x as i32, y as i32), ring, color);
                draw_hollow_circle_mut(&mut canvas, (x as i32, y as i32), ring + 1, color);
            }
        }
    }

    let bar_height = ((6.0 * scale).round() as u32).min(height).max(1);
    let bar_color = if issues.is_empty() {
        OK_BAR_COLOR
    } else {
        ISSUE_BAR_COLOR
    };
    if width > 0 && height > 0 {
        draw_filled_rect_mut(&mut canvas, Rect::at(0, 0).of_size(width, bar_height), bar_color);
    }

    canvas
}

/// Where to draw an issue marker.
fn region_anchor(landmarks: &LandmarkSet, region: BodyRegion) -> Option<Landmark> {
    match region {
        BodyRegion::LeftKnee => landmarks.get(JointId::LeftKnee).copied(),
        BodyRegion::RightKnee => landmarks.get(JointId::RightKnee).copied(),
        BodyRegion::Neck => landmarks.get(JointId::Nose).copied(),
        BodyRegion::Spine => Some(Landmark::midpoint(
            landmarks.get(JointId::LeftShoulder)?,
            landmarks.get(JointId::RightShoulder)?,
        )),
    }
}

fn severity_color(severity: Severity) -> Rgb<u8> {
    match severity {
        Severity::High => HIGH_COLOR,
        Severity::Moderate => MODERATE_COLOR,
        Severity::Low => LOW_COLOR,
    }
}

fn to_canvas(lm: &Landmark, width: u32, height: u32) -> (f32, f32) {
    let (x, y) = lm.to_pixel(width, height);
    (x as f32, y as f32)
}
