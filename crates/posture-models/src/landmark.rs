//! Body landmarks produced by a pose source.
//!
//! A frame yields either the full 33-point BlazePose skeleton or nothing.
//! Joints are addressed through [`JointId`] rather than by name, so a typo
//! cannot silently read the wrong point.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The 33 BlazePose landmarks in their canonical model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum JointId {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl JointId {
    /// Number of landmarks in a detected pose.
    pub const COUNT: usize = 33;

    /// All joints, positionally aligned with model output.
    pub const ALL: [JointId; Self::COUNT] = [
        JointId::Nose,
        JointId::LeftEyeInner,
        JointId::LeftEye,
        JointId::LeftEyeOuter,
        JointId::RightEyeInner,
        JointId::RightEye,
        JointId::RightEyeOuter,
        JointId::LeftEar,
        JointId::RightEar,
        JointId::MouthLeft,
        JointId::MouthRight,
        JointId::LeftShoulder,
        JointId::RightShoulder,
        JointId::LeftElbow,
        JointId::RightElbow,
        JointId::LeftWrist,
        JointId::RightWrist,
        JointId::LeftPinky,
        JointId::RightPinky,
        JointId::LeftIndex,
        JointId::RightIndex,
        JointId::LeftThumb,
        JointId::RightThumb,
        JointId::LeftHip,
        JointId::RightHip,
        JointId::LeftKnee,
        JointId::RightKnee,
        JointId::LeftAnkle,
        JointId::RightAnkle,
        JointId::LeftHeel,
        JointId::RightHeel,
        JointId::LeftFootIndex,
        JointId::RightFootIndex,
    ];

    /// Position of this joint in a [`LandmarkSet`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Anatomical snake_case name, matching the wire format.
    pub fn as_str(self) -> &'static str {
        match self {
            JointId::Nose => "nose",
            JointId::LeftEyeInner => "left_eye_inner",
            JointId::LeftEye => "left_eye",
            JointId::LeftEyeOuter => "left_eye_outer",
            JointId::RightEyeInner => "right_eye_inner",
            JointId::RightEye => "right_eye",
            JointId::RightEyeOuter => "right_eye_outer",
            JointId::LeftEar => "left_ear",
            JointId::RightEar => "right_ear",
            JointId::MouthLeft => "mouth_left",
            JointId::MouthRight => "mouth_right",
            JointId::LeftShoulder => "left_shoulder",
            JointId::RightShoulder => "right_shoulder",
            JointId::LeftElbow => "left_elbow",
            JointId::RightElbow => "right_elbow",
            JointId::LeftWrist => "left_wrist",
            JointId::RightWrist => "right_wrist",
            JointId::LeftPinky => "left_pinky",
            JointId::RightPinky => "right_pinky",
            JointId::LeftIndex => "left_index",
            JointId::RightIndex => "right_index",
            JointId::LeftThumb => "left_thumb",
            JointId::RightThumb => "right_thumb",
            JointId::LeftHip => "left_hip",
            JointId::RightHip => "right_hip",
            JointId::LeftKnee => "left_knee",
            JointId::RightKnee => "right_knee",
            JointId::LeftAnkle => "left_ankle",
            JointId::RightAnkle => "right_ankle",
            JointId::LeftHeel => "left_heel",
            JointId::RightHeel => "right_heel",
            JointId::LeftFootIndex => "left_foot_index",
            JointId::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Skeleton edges drawn on overlays.
pub const POSE_CONNECTIONS: &[(JointId, JointId)] = &[
    (JointId::Nose, JointId::LeftEyeInner),
    (JointId::LeftEyeInner, JointId::LeftEye),
    (JointId::LeftEye, JointId::LeftEyeOuter),
    (JointId::LeftEyeOuter, JointId::LeftEar),
    (JointId::Nose, JointId::RightEyeInner),
    (JointId::RightEyeInner, JointId::RightEye),
    (JointId::RightEye, JointId::RightEyeOuter),
    (JointId::RightEyeOuter, JointId::RightEar),
    (JointId::MouthLeft, JointId::MouthRight),
    (JointId::LeftShoulder, JointId::RightShoulder),
    (JointId::LeftShoulder, JointId::LeftElbow),
    (JointId::LeftElbow, JointId::LeftWrist),
    (JointId::LeftWrist, JointId::LeftPinky),
    (JointId::LeftWrist, JointId::LeftIndex),
    (JointId::LeftWrist, JointId::LeftThumb),
    (JointId::LeftPinky, JointId::LeftIndex),
    (JointId::RightShoulder, JointId::RightElbow),
    (JointId::RightElbow, JointId::RightWrist),
    (JointId::RightWrist, JointId::RightPinky),
    (JointId::RightWrist, JointId::RightIndex),
    (JointId::RightWrist, JointId::RightThumb),
    (JointId::RightPinky, JointId::RightIndex),
    (JointId::LeftShoulder, JointId::LeftHip),
    (JointId::RightShoulder, JointId::RightHip),
    (JointId::LeftHip, JointId::RightHip),
    (JointId::LeftHip, JointId::LeftKnee),
    (JointId::RightHip, JointId::RightKnee),
    (JointId::LeftKnee, JointId::LeftAnkle),
    (JointId::RightKnee, JointId::RightAnkle),
    (JointId::LeftAnkle, JointId::LeftHeel),
    (JointId::RightAnkle, JointId::RightHeel),
    (JointId::LeftHeel, JointId::LeftFootIndex),
    (JointId::RightHeel, JointId::RightFootIndex),
    (JointId::LeftAnkle, JointId::LeftFootIndex),
    (JointId::RightAnkle, JointId::RightFootIndex),
];

/// A single landmark in normalized frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Landmark {
    /// Horizontal position (0.0 = left edge, 1.0 = right edge)
    pub x: f64,
    /// Vertical position (0.0 = top edge, 1.0 = bottom edge)
    pub y: f64,
    /// Depth relative to the hips; 0.0 for 2-D sources
    #[serde(default)]
    pub z: f64,
    /// Likelihood the landmark is visible, in [0, 1]
    #[serde(default = "default_visibility")]
    pub visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Planar landmark with full visibility.
    pub fn xy(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    pub fn point2(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn point3(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Pixel position inside a `width` x `height` frame.
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        let px = (self.x * width as f64) as i32;
        let py = (self.y * height as f64) as i32;
        (px, py)
    }

    /// Midpoint of two landmarks; visibility is the weaker of the pair.
    pub fn midpoint(a: &Landmark, b: &Landmark) -> Landmark {
        Landmark {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
            z: (a.z + b.z) / 2.0,
            visibility: a.visibility.min(b.visibility),
        }
    }
}

/// Errors raised while building or reading a landmark set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LandmarkError {
    #[error("expected 0 or {expected} landmarks, got {actual}", expected = JointId::COUNT)]
    InvalidCount { actual: usize },

    #[error("landmark {0} is not available")]
    Missing(JointId),
}

/// Landmarks for one frame: all 33 joints, or none when no pose was found.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    /// Build a set, rejecting any length other than 0 or 33.
    pub fn new(landmarks: Vec<Landmark>) -> Result<Self, LandmarkError> {
        match landmarks.len() {
            0 | JointId::COUNT => Ok(Self { landmarks }),
            actual => Err(LandmarkError::InvalidCount { actual }),
        }
    }

    /// The set reported when no pose is detected.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a full set from a per-joint function.
    pub fn from_fn(mut f: impl FnMut(JointId) -> Landmark) -> Self {
        Self {
            landmarks: JointId::ALL.iter().map(|&joint| f(joint)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn get(&self, joint: JointId) -> Option<&Landmark> {
        self.landmarks.get(joint.index())
    }

    pub fn require(&self, joint: JointId) -> Result<&Landmark, LandmarkError> {
        self.get(joint).ok_or(LandmarkError::Missing(joint))
    }

    /// Replace one landmark; no-op on an empty set.
    pub fn set(&mut self, joint: JointId, landmark: Landmark) {
        if let Some(slot) = self.landmarks.get_mut(joint.index()) {
            *slot = landmark;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (JointId, &Landmark)> {
        JointId::ALL.iter().copied().zip(self.landmarks.iter())
    }

    pub fn as_slice(&self) -> &[Landmark] {
        &self.landmarks
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(landmarks: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::new(landmarks)
    }
}

impl From<LandmarkSet> for Vec<Landmark> {
    fn from(set: LandmarkSet) -> Self {
        set.landmarks
    }
}

impl JsonSchema for LandmarkSet {
    fn schema_name() -> String {
        "LandmarkSet".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <Vec<Landmark>>::json_schema(gen)
    }
}
