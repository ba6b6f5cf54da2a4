//! Per-source adapters
//!
//! Primary: MediaPipe Pose, 33 landmarks, normalized x/y, relative z, visibility.
//! Secondary: COCO-17 style detector, pixel x/y, integer id, score, no depth.
//! Both are converted to canonical `Observation`s before fusion.

use super::keypoints::{KeypointId, KEYPOINT_COUNT};
use crate::error::{GestureError, GestureResult};

// ============================================================================
// PRIMARY SOURCE (MediaPipe Pose - 33 total)
// ============================================================================

pub const PRIMARY_LANDMARK_COUNT: usize = 33;

/// Floats per primary landmark in flat form: x, y, z, visibility
pub const PRIMARY_STRIDE: usize = 4;

/// MediaPipe index for each canonical id (canonical order)
const PRIMARY_INDEX: [usize; KEYPOINT_COUNT] = [
    0,  // nose
    2,  // left eye
    5,  // right eye
    7,  // left ear
    8,  // right ear
    11, // left shoulder
    12, // right shoulder
    13, // left elbow
    14, // right elbow
    15, // left wrist
    16, // right wrist
    23, // left hip
    24, // right hip
    25, // left knee
    26, // right knee
    27, // left ankle
    28, // right ankle
    29, // left heel
    30, // right heel
    31, // left foot index
    32, // right foot index
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PrimaryLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

/// One frame from the primary source
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrimarySkeleton {
    pub landmarks: Vec<PrimaryLandmark>,
}

impl PrimarySkeleton {
    pub fn new(landmarks: Vec<PrimaryLandmark>) -> Self {
        Self { landmarks }
    }

    /// Parse 33 × (x, y, z, visibility)
    pub fn from_flat(data: &[f32]) -> GestureResult<Self> {
        let expected = PRIMARY_LANDMARK_COUNT * PRIMARY_STRIDE;
        if data.len() != expected {
            return Err(GestureError::Input(format!(
                "primary landmark data length {} (expected {})",
                data.len(),
                expected
            )));
        }
        let landmarks = data
            .chunks_exact(PRIMARY_STRIDE)
            .map(|c| PrimaryLandmark { x: c[0], y: c[1], z: c[2], visibility: c[3] })
            .collect();
        Ok(Self { landmarks })
    }
}

// ============================================================================
// SECONDARY SOURCE (COCO 17, pixel space)
// ============================================================================

/// Floats per secondary keypoint in flat form: x, y, id, score
pub const SECONDARY_STRIDE: usize = 4;

/// Fixed remap table: secondary id -> canonical id. Everything else is ignored.
pub const SECONDARY_REMAP: [(u8, KeypointId); 10] = [
    (5, KeypointId::LeftShoulder),
    (6, KeypointId::RightShoulder),
    (7, KeypointId::LeftElbow),
    (8, KeypointId::RightElbow),
    (9, KeypointId::LeftWrist),
    (10, KeypointId::RightWrist),
    (11, KeypointId::LeftHip),
    (12, KeypointId::RightHip),
    (13, KeypointId::LeftKnee),
    (14, KeypointId::RightKnee),
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SecondaryKeypoint {
    pub x: f32, // pixels
    pub y: f32, // pixels
    pub id: u8,
    pub score: f32,
}

/// One frame from the secondary source
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SecondarySkeleton {
    pub keypoints: Vec<SecondaryKeypoint>,
    pub frame_width: f32,
    pub frame_height: f32,
}

impl SecondarySkeleton {
    pub fn new(keypoints: Vec<SecondaryKeypoint>, frame_width: f32, frame_height: f32) -> Self {
        Self { keypoints, frame_width, frame_height }
    }

    /// Parse n × (x, y, id, score)
    pub fn from_flat(data: &[f32], frame_width: f32, frame_height: f32) -> GestureResult<Self> {
        if data.len() % SECONDARY_STRIDE != 0 {
            return Err(GestureError::Input(format!(
                "secondary keypoint data length {} is not a multiple of {}",
                data.len(),
                SECONDARY_STRIDE
            )));
        }
        let keypoints = data
            .chunks_exact(SECONDARY_STRIDE)
            .filter(|c| c[2] >= 0.0 && c[2] <= u8::MAX as f32)
            .map(|c| SecondaryKeypoint { x: c[0], y: c[1], id: c[2] as u8, score: c[3] })
            .collect();
        Ok(Self { keypoints, frame_width, frame_height })
    }
}

// ============================================================================
// ADAPTERS
// ============================================================================

/// A source reading already in canonical space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    pub x: f32,
    pub y: f32,
    /// None when the source has no depth
    pub z: Option<f32>,
    pub confidence: f32,
}

pub type Observations = [Option<Observation>; KEYPOINT_COUNT];

pub fn canonical_secondary_id(id: u8) -> Option<KeypointId> {
    SECONDARY_REMAP
        .iter()
        .find(|(src, _)| *src == id)
        .map(|(_, canonical)| *canonical)
}

/// Map primary landmarks onto canonical ids
pub fn adapt_primary(skeleton: &PrimarySkeleton) -> Observations {
    let mut out: Observations = [None; KEYPOINT_COUNT];
    for id in KeypointId::ALL {
        if let Some(lm) = skeleton.landmarks.get(PRIMARY_INDEX[id.index()]) {
            out[id.index()] = Some(Observation {
                x: lm.x,
                y: lm.y,
                z: Some(lm.z),
                confidence: lm.visibility,
            });
        }
    }
    out
}

/// Remap and normalize secondary keypoints onto canonical ids
pub fn adapt_secondary(skeleton: &SecondarySkeleton) -> GestureResult<Observations> {
    let usable_size = |v: f32| v.is_finite() && v > 0.0;
    if !usable_size(skeleton.frame_width) || !usable_size(skeleton.frame_height) {
        return Err(GestureError::Input(format!(
            "secondary frame size {}x{} is not positive and finite",
            skeleton.frame_width, skeleton.frame_height
        )));
    }

    let mut out: Observations = [None; KEYPOINT_COUNT];
    for kp in &skeleton.keypoints {
        let Some(id) = canonical_secondary_id(kp.id) else {
            continue;
        };
        out[id.index()] = Some(Observation {
            x: kp.x / skeleton.frame_width,
            y: kp.y / skeleton.frame_height,
            z: None,
            confidence: kp.score,
        });
    }
    Ok(out)
}
