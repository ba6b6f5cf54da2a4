//! Canonical keypoint layout shared by every stage after fusion
//!
//! Source-specific indexing (MediaPipe 33, COCO 17) stops at the adapters in
//! `sources.rs`; detectors only ever see `KeypointId`.

use serde::{Deserialize, Serialize};

// ============================================================================
// CANONICAL LANDMARKS
// ============================================================================

/// Number of canonical landmarks in a skeleton
pub const KEYPOINT_COUNT: usize = 21;

/// Canonical body landmark
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeypointId {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl KeypointId {
    /// All ids in canonical order (index == position)
    pub const ALL: [KeypointId; KEYPOINT_COUNT] = [
        KeypointId::Nose,
        KeypointId::LeftEye,
        KeypointId::RightEye,
        KeypointId::LeftEar,
        KeypointId::RightEar,
        KeypointId::LeftShoulder,
        KeypointId::RightShoulder,
        KeypointId::LeftElbow,
        KeypointId::RightElbow,
        KeypointId::LeftWrist,
        KeypointId::RightWrist,
        KeypointId::LeftHip,
        KeypointId::RightHip,
        KeypointId::LeftKnee,
        KeypointId::RightKnee,
        KeypointId::LeftAnkle,
        KeypointId::RightAnkle,
        KeypointId::LeftHeel,
        KeypointId::RightHeel,
        KeypointId::LeftFootIndex,
        KeypointId::RightFootIndex,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            KeypointId::Nose => "nose",
            KeypointId::LeftEye => "left_eye",
            KeypointId::RightEye => "right_eye",
            KeypointId::LeftEar => "left_ear",
            KeypointId::RightEar => "right_ear",
            KeypointId::LeftShoulder => "left_shoulder",
            KeypointId::RightShoulder => "right_shoulder",
            KeypointId::LeftElbow => "left_elbow",
            KeypointId::RightElbow => "right_elbow",
            KeypointId::LeftWrist => "left_wrist",
            KeypointId::RightWrist => "right_wrist",
            KeypointId::LeftHip => "left_hip",
            KeypointId::RightHip => "right_hip",
            KeypointId::LeftKnee => "left_knee",
            KeypointId::RightKnee => "right_knee",
            KeypointId::LeftAnkle => "left_ankle",
            KeypointId::RightAnkle => "right_ankle",
            KeypointId::LeftHeel => "left_heel",
            KeypointId::RightHeel => "right_heel",
            KeypointId::LeftFootIndex => "left_foot_index",
            KeypointId::RightFootIndex => "right_foot_index",
        }
    }
}

// ============================================================================
// KEYPOINT / SKELETON
// ============================================================================

/// One fused landmark (normalized coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Keypoint {
    pub x: f32,  // 0-1 normalized
    pub y: f32,  // 0-1 normalized
    pub z: f32,  // Relative depth
    pub confidence: f32,
    /// Observed by at least one source this frame
    pub fresh: bool,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, z: f32, confidence: f32) -> Self {
        Self { x, y, z, confidence, fresh: true }
    }

    /// Fresh this frame and strictly above the confidence threshold
    pub fn is_usable(&self, min_confidence: f32) -> bool {
        self.fresh && self.confidence > min_confidence
    }

    pub fn distance_to(&self, other: &Keypoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Fixed-length skeleton indexed by `KeypointId`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Skeleton {
    points: [Keypoint; KEYPOINT_COUNT],
}

/// Output of fusion + smoothing; same shape as any other skeleton
pub type FusedSkeleton = Skeleton;

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        KEYPOINT_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, id: KeypointId) -> &Keypoint {
        &self.points[id.index()]
    }

    pub fn set(&mut self, id: KeypointId, keypoint: Keypoint) {
        self.points[id.index()] = keypoint;
    }

    /// Keypoint if usable this frame
    pub fn usable(&self, id: KeypointId, min_confidence: f32) -> Option<&Keypoint> {
        let kp = self.get(id);
        kp.is_usable(min_confidence).then_some(kp)
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeypointId, &Keypoint)> {
        KeypointId::ALL.iter().copied().zip(self.points.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_match_positions() {
        for (i, id) in KeypointId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn test_confidence_must_exceed_threshold() {
        let at = Keypoint::new(0.5, 0.5, 0.0, 0.5);
        let above = Keypoint::new(0.5, 0.5, 0.0, 0.51);
        assert!(!at.is_usable(0.5));
        assert!(above.is_usable(0.5));
    }

    #[test]
    fn test_stale_keypoint_is_not_usable() {
        let mut kp = Keypoint::new(0.5, 0.5, 0.0, 0.9);
        kp.fresh = false;
        assert!(!kp.is_usable(0.5));
    }
}
