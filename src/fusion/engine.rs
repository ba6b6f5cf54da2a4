//! Keypoint fusion - confidence-gated merge of both pose sources
//!
//! Per canonical id: a source counts only if its confidence exceeds the gate.
//! Both qualify -> per-axis average. One qualifies -> that one.
//! Neither -> previous fused value is held (and marked stale).

use super::keypoints::{Keypoint, KeypointId, Skeleton};
use super::sources::{
    adapt_primary, adapt_secondary, Observation, PrimarySkeleton, SecondarySkeleton,
};

pub struct KeypointFusionEngine {
    /// Last fused skeleton; held values come from here
    fused: Skeleton,
    /// Minimum confidence (exclusive) to accept a source reading
    threshold: f32,
}

impl KeypointFusionEngine {
    pub fn new(threshold: f32) -> Self {
        Self {
            fused: Skeleton::default(),
            threshold,
        }
    }

    /// Fuse one frame. Either source may be absent.
    pub fn fuse(
        &mut self,
        primary: Option<&PrimarySkeleton>,
        secondary: Option<&SecondarySkeleton>,
    ) -> Skeleton {
        let primary_obs = primary.map(adapt_primary);
        let secondary_obs = secondary.and_then(|s| match adapt_secondary(s) {
            Ok(obs) => Some(obs),
            Err(e) => {
                log::warn!("Dropping secondary skeleton: {}", e);
                None
            }
        });

        for id in KeypointId::ALL {
            let i = id.index();
            let p = primary_obs.as_ref().and_then(|o| o[i]).filter(|o| self.qualifies(o));
            let s = secondary_obs.as_ref().and_then(|o| o[i]).filter(|o| self.qualifies(o));
            let prev = *self.fused.get(id);

            let next = match (p, s) {
                (Some(p), Some(s)) => Keypoint::new(
                    (p.x + s.x) * 0.5,
                    (p.y + s.y) * 0.5,
                    Self::blend_z(p.z, s.z, prev.z),
                    (p.confidence + s.confidence) * 0.5,
                ),
                (Some(o), None) | (None, Some(o)) => {
                    Keypoint::new(o.x, o.y, o.z.unwrap_or(prev.z), o.confidence)
                }
                (None, None) => Keypoint { fresh: false, ..prev },
            };
            self.fused.set(id, next);
        }

        self.fused
    }

    /// Last fused skeleton
    pub fn current(&self) -> &Skeleton {
        &self.fused
    }

    /// Drop all held values
    pub fn reset(&mut self) {
        self.fused = Skeleton::default();
    }

    fn qualifies(&self, obs: &Observation) -> bool {
        obs.confidence > self.threshold
    }

    fn blend_z(a: Option<f32>, b: Option<f32>, held: f32) -> f32 {
        match (a, b) {
            (Some(a), Some(b)) => (a + b) * 0.5,
            (Some(z), None) | (None, Some(z)) => z,
            (None, None) => held,
        }
    }
}

impl Default for KeypointFusionEngine {
    fn default() -> Self {
        Self::new(0.5)
    }
}
