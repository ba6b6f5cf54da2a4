//! Torso-twist turning
//!
//! Bootstrap: average the first N inter-shoulder distances into a baseline.
//! Active: ratio = distance / baseline. Below the turn threshold the yaw
//! target moves by `min((1 - ratio) * 2, 2) * gain` degrees per frame in the
//! direction of the dominant shoulder's horizontal motion.
//!
//! | phase     | event                      | next      |
//! |-----------|----------------------------|-----------|
//! | Bootstrap | Nth valid sample           | Active    |
//! | Active    | ratio < threshold          | Active    |
//! | *         | shoulders unusable         | same      |
//! | *         | reset                      | Bootstrap |

use super::events::{GestureEvent, GestureKind};
use crate::calibration::SampleKind;
use crate::config::TrackingConfig;
use crate::fusion::{KeypointId, Skeleton};
use crate::session::SessionContext;

#[derive(Clone, Debug, PartialEq)]
pub enum TurnPhase {
    Bootstrap { samples: Vec<f32> },
    Active { baseline: f32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    #[default]
    Right,
}

impl TurnDirection {
    fn sign(self) -> f32 {
        match self {
            TurnDirection::Left => -1.0,
            TurnDirection::Right => 1.0,
        }
    }
}

pub struct TurnDetector {
    phase: TurnPhase,
    prev_left_x: Option<f32>,
    prev_right_x: Option<f32>,
    direction: TurnDirection,
    target_yaw: f32,
    ratio: Option<f32>,

    min_confidence: f32,
    bootstrap_samples: usize,
    ratio_threshold: f32,
    deep_ratio_threshold: f32,
    gain_deg: f32,
    clamp_deg: f32,
    deep_clamp_deg: f32,
}

impl TurnDetector {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            phase: TurnPhase::Bootstrap { samples: Vec::with_capacity(config.bootstrap_samples) },
            prev_left_x: None,
            prev_right_x: None,
            direction: TurnDirection::default(),
            target_yaw: 0.0,
            ratio: None,
            min_confidence: config.min_confidence,
            bootstrap_samples: config.bootstrap_samples.max(1),
            ratio_threshold: config.turn_ratio_threshold,
            deep_ratio_threshold: config.deep_turn_ratio_threshold,
            gain_deg: config.turn_gain_deg,
            clamp_deg: config.yaw_clamp_deg,
            deep_clamp_deg: config.deep_yaw_clamp_deg,
        }
    }

    pub fn phase(&self) -> &TurnPhase {
        &self.phase
    }

    pub fn direction(&self) -> TurnDirection {
        self.direction
    }

    /// Current yaw target in degrees (0 = facing away from the camera)
    pub fn target_yaw(&self) -> f32 {
        self.target_yaw
    }

    /// distance / baseline for this frame; None while bootstrapping or
    /// when the shoulders were not usable
    pub fn distance_ratio(&self) -> Option<f32> {
        self.ratio
    }

    pub fn update(&mut self, skeleton: &Skeleton, now_ms: f64, ctx: &mut SessionContext) -> Option<GestureEvent> {
        let left = skeleton.usable(KeypointId::LeftShoulder, self.min_confidence).copied();
        let right = skeleton.usable(KeypointId::RightShoulder, self.min_confidence).copied();
        let (Some(left), Some(right)) = (left, right) else {
            self.ratio = None;
            return None;
        };

        let distance = left.distance_to(&right);
        let left_dx = self.prev_left_x.map_or(0.0, |x| left.x - x);
        let right_dx = self.prev_right_x.map_or(0.0, |x| right.x - x);
        self.prev_left_x = Some(left.x);
        self.prev_right_x = Some(right.x);

        if distance <= f32::EPSILON {
            self.ratio = None;
            return None;
        }

        let baseline = match &mut self.phase {
            TurnPhase::Bootstrap { samples } => {
                samples.push(distance);
                if samples.len() >= self.bootstrap_samples {
                    let baseline = samples.iter().sum::<f32>() / samples.len() as f32;
                    log::info!("🧍 Shoulder baseline bootstrapped: {:.3}", baseline);
                    self.phase = TurnPhase::Active { baseline };
                    ctx.seed_baseline(baseline);
                }
                self.ratio = None;
                return None;
            }
            TurnPhase::Active { baseline } => *baseline,
        };

        let ratio = distance / baseline;
        self.ratio = Some(ratio);
        ctx.record_sample(SampleKind::ShoulderDistance, distance);

        if ratio >= self.ratio_threshold {
            return None;
        }

        self.direction = dominant_direction(left_dx, right_dx).unwrap_or(self.direction);
        let intensity = ((1.0 - ratio) * 2.0).min(2.0);
        let delta = self.direction.sign() * intensity * self.gain_deg;

        let clamp = if ratio < self.deep_ratio_threshold { self.deep_clamp_deg } else { self.clamp_deg };
        // Never snap back a yaw that a deep turn already carried past the clamp
        let bound = clamp.max(self.target_yaw.abs());
        let next = (self.target_yaw + delta).clamp(-bound, bound);
        let applied = next - self.target_yaw;
        if applied == 0.0 {
            return None;
        }

        self.target_yaw = next;
        ctx.record_sample(SampleKind::Turn, applied);
        Some(GestureEvent::new(now_ms, GestureKind::Turn { yaw_delta: applied, target_yaw: next }))
    }

    /// Back to bootstrap; the yaw target is world state and survives
    pub fn reset(&mut self) {
        self.phase = TurnPhase::Bootstrap { samples: Vec::with_capacity(self.bootstrap_samples) };
        self.prev_left_x = None;
        self.prev_right_x = None;
        self.direction = TurnDirection::default();
        self.ratio = None;
    }
}

/// Sign of the larger horizontal shoulder delta; None when neither moved
fn dominant_direction(left_dx: f32, right_dx: f32) -> Option<TurnDirection> {
    let dx = if left_dx.abs() >= right_dx.abs() { left_dx } else { right_dx };
    if dx > 0.0 {
        Some(TurnDirection::Right)
    } else if dx < 0.0 {
        Some(TurnDirection::Left)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::Keypoint;
    use crate::store::MemoryStore;
    use approx::assert_relative_eq;

    const D: f32 = 0.25;

    fn shoulders(left_x: f32, right_x: f32) -> Skeleton {
        let mut s = Skeleton::new();
        s.set(KeypointId::LeftShoulder, Keypoint::new(left_x, 0.3, 0.0, 0.9));
        s.set(KeypointId::RightShoulder, Keypoint::new(right_x, 0.3, 0.0, 0.9));
        s
    }

    fn bootstrapped(config: &TrackingConfig) -> (TurnDetector, SessionContext) {
        let mut ctx = SessionContext::load(Box::new(MemoryStore::new()), config);
        let mut turn = TurnDetector::new(config);
        for i in 0..config.bootstrap_samples {
            assert!(turn.update(&shoulders(0.375, 0.375 + D), i as f64 * 33.0, &mut ctx).is_none());
        }
        (turn, ctx)
    }

    #[test]
    fn test_bootstrap_seeds_baseline() {
        let config = TrackingConfig::default();
        let (turn, ctx) = bootstrapped(&config);
        assert_eq!(turn.phase(), &TurnPhase::Active { baseline: turn_baseline(&turn) });
        assert_relative_eq!(turn_baseline(&turn), D, epsilon = 1e-5);
        assert_relative_eq!(ctx.profile().baseline_shoulder_distance, D, epsilon = 1e-5);
    }

    fn turn_baseline(turn: &TurnDetector) -> f32 {
        match turn.phase() {
            TurnPhase::Active { baseline } => *baseline,
            TurnPhase::Bootstrap { .. } => panic!("still bootstrapping"),
        }
    }

    #[test]
    fn test_twisted_torso_turns() {
        let config = TrackingConfig::default();
        let (mut turn, mut ctx) = bootstrapped(&config);
        // Left shoulder slides right: 0.85 * D
        let event = turn.update(&shoulders(0.625 - 0.85 * D, 0.625), 400.0, &mut ctx).unwrap();
        match event.kind {
            GestureKind::Turn { yaw_delta, target_yaw } => {
                assert_relative_eq!(yaw_delta, 0.3 * config.turn_gain_deg, epsilon = 1e-3);
                assert_relative_eq!(target_yaw, yaw_delta);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(turn.direction(), TurnDirection::Right);
    }

    #[test]
    fn test_slight_narrowing_does_not_turn() {
        let config = TrackingConfig::default();
        let (mut turn, mut ctx) = bootstrapped(&config);
        assert!(turn.update(&shoulders(0.625 - 0.95 * D, 0.625), 400.0, &mut ctx).is_none());
        assert_eq!(turn.target_yaw(), 0.0);
        assert_relative_eq!(turn.distance_ratio().unwrap(), 0.95, epsilon = 1e-4);
    }

    #[test]
    fn test_right_shoulder_moving_left_turns_left() {
        let config = TrackingConfig::default();
        let (mut turn, mut ctx) = bootstrapped(&config);
        turn.update(&shoulders(0.375, 0.375 + 0.8 * D), 400.0, &mut ctx).unwrap();
        assert_eq!(turn.direction(), TurnDirection::Left);
        assert!(turn.target_yaw() < 0.0);
    }

    #[test]
    fn test_still_shoulders_keep_direction() {
        let config = TrackingConfig::default();
        let (mut turn, mut ctx) = bootstrapped(&config);
        turn.update(&shoulders(0.375, 0.375 + 0.8 * D), 400.0, &mut ctx);
        let before = turn.target_yaw();
        turn.update(&shoulders(0.375, 0.375 + 0.8 * D), 433.0, &mut ctx).unwrap();
        assert_eq!(turn.direction(), TurnDirection::Left);
        assert!(turn.target_yaw() < before);
    }

    #[test]
    fn test_yaw_clamped_then_lifted_by_deep_turn() {
        let config = TrackingConfig { turn_gain_deg: 50.0, ..Default::default() };
        let (mut turn, mut ctx) = bootstrapped(&config);
        for i in 0..10 {
            turn.update(&shoulders(0.625 - 0.8 * D, 0.625), 400.0 + i as f64 * 33.0, &mut ctx);
        }
        assert_relative_eq!(turn.target_yaw(), 90.0);
        // Clamped frames with no room left emit nothing
        assert!(turn.update(&shoulders(0.625 - 0.8 * D, 0.625), 800.0, &mut ctx).is_none());

        for i in 0..10 {
            turn.update(&shoulders(0.625 - 0.4 * D, 0.625), 900.0 + i as f64 * 33.0, &mut ctx);
        }
        assert_relative_eq!(turn.target_yaw(), 180.0);

        // Back to a shallow twist, still turning right: no snap to the narrower clamp
        let left_x = 0.625 - 0.4 * D;
        assert!(turn.update(&shoulders(left_x, left_x + 0.8 * D), 1300.0, &mut ctx).is_none());
        assert_relative_eq!(turn.target_yaw(), 180.0);
    }

    #[test]
    fn test_records_turn_and_shoulder_samples() {
        let config = TrackingConfig::default();
        let (mut turn, mut ctx) = bootstrapped(&config);
        let queued = ctx.classifier.queue().len();
        turn.update(&shoulders(0.625 - 0.85 * D, 0.625), 400.0, &mut ctx);
        // One shoulder sample plus one turn sample
        assert_eq!(ctx.classifier.queue().len(), queued + 2);
        let window = ctx.calibrator.window(SampleKind::ShoulderDistance).unwrap();
        assert_relative_eq!(window.last().unwrap(), 0.85 * D, epsilon = 1e-5);
    }

    #[test]
    fn test_missing_shoulder_leaves_yaw() {
        let config = TrackingConfig::default();
        let (mut turn, mut ctx) = bootstrapped(&config);
        turn.update(&shoulders(0.625 - 0.85 * D, 0.625), 400.0, &mut ctx);
        let yaw = turn.target_yaw();
        let mut partial = shoulders(0.3, 0.5);
        partial.set(KeypointId::RightShoulder, Keypoint::new(0.5, 0.3, 0.0, 0.2));
        assert!(turn.update(&partial, 433.0, &mut ctx).is_none());
        assert_eq!(turn.target_yaw(), yaw);
        assert_eq!(turn.distance_ratio(), None);
    }

    #[test]
    fn test_reset_returns_to_bootstrap() {
        let config = TrackingConfig::default();
        let (mut turn, mut ctx) = bootstrapped(&config);
        turn.update(&shoulders(0.625 - 0.85 * D, 0.625), 400.0, &mut ctx);
        let yaw = turn.target_yaw();
        turn.reset();
        turn.reset();
        assert!(matches!(turn.phase(), TurnPhase::Bootstrap { samples } if samples.is_empty()));
        assert_eq!(turn.target_yaw(), yaw);
        assert!(turn.update(&shoulders(0.3, 0.4), 500.0, &mut ctx).is_none());
    }
}
