//! Exponential smoothing of the fused skeleton
//!
//! smoothed = α·prev + (1-α)·new, per keypoint and per axis.
//! First observation of a keypoint seeds the filter directly.

use super::keypoints::{Keypoint, KeypointId, Skeleton, KEYPOINT_COUNT};

pub struct SmoothingFilter {
    /// Weight on the previous value
    alpha: f32,
    /// (x, y, z) per keypoint; None = zero state
    state: [Option<(f32, f32, f32)>; KEYPOINT_COUNT],
}

impl SmoothingFilter {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            state: [None; KEYPOINT_COUNT],
        }
    }

    /// Smooth one fused frame
    pub fn apply(&mut self, fused: &Skeleton) -> Skeleton {
        let mut out = *fused;
        for id in KeypointId::ALL {
            let raw = fused.get(id);
            let slot = &mut self.state[id.index()];

            let (x, y, z) = match (*slot, raw.fresh) {
                (Some((px, py, pz)), true) => (
                    self.alpha * px + (1.0 - self.alpha) * raw.x,
                    self.alpha * py + (1.0 - self.alpha) * raw.y,
                    self.alpha * pz + (1.0 - self.alpha) * raw.z,
                ),
                (None, true) => (raw.x, raw.y, raw.z),
                // Stale: hold whatever we last output
                (Some(prev), false) => prev,
                (None, false) => (raw.x, raw.y, raw.z),
            };

            if raw.fresh {
                *slot = Some((x, y, z));
            }
            out.set(id, Keypoint { x, y, z, ..*raw });
        }
        out
    }

    /// Back to zero state (tracking stopped)
    pub fn reset(&mut self) {
        self.state = [None; KEYPOINT_COUNT];
    }

    pub fn is_seeded(&self, id: KeypointId) -> bool {
        self.state[id.index()].is_some()
    }
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(0.7)
    }
}
