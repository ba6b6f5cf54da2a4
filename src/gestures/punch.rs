//! Punch detection and hit-testing
//!
//! Each wrist is lifted into world space around the body anchor, its
//! forward velocity is tracked frame to frame, and a punch fires when
//! velocity, elbow deflection and torso twist all clear their thresholds.

use nalgebra::{Rotation3, Vector3};

use super::angles::elbow_deflection_deg;
use super::events::{GestureEvent, GestureKind, Hand, HitTargets, PunchHit};
use crate::calibration::SampleKind;
use crate::config::{PunchPriority, TrackingConfig};
use crate::experience::Skill;
use crate::fusion::{Keypoint, KeypointId, Skeleton};
use crate::session::SessionContext;

// ============================================================================
// HAND TRACKING
// ============================================================================

/// Previous world position of one hand
#[derive(Clone, Copy, Debug, Default)]
pub struct HandTracker {
    prev: Option<(Vector3<f32>, f64)>,
}

impl HandTracker {
    /// Forward velocity (units/s) since the previous sample, then remember this one
    fn advance(&mut self, position: Vector3<f32>, forward: &Vector3<f32>, now_ms: f64) -> Option<f32> {
        let velocity = self.prev.and_then(|(prev, t)| {
            let dt = ((now_ms - t) / 1000.0) as f32;
            (dt > 0.0).then(|| forward.dot(&(position - prev)) / dt)
        });
        self.prev = Some((position, now_ms));
        velocity
    }

    pub fn last_position(&self) -> Option<Vector3<f32>> {
        self.prev.map(|(p, _)| p)
    }

    fn reset(&mut self) {
        self.prev = None;
    }
}

/// World-space hand position: mirrored x, reach-scaled, rotated by yaw around the anchor
pub fn hand_position(anchor: &Vector3<f32>, yaw_deg: f32, wrist: &Keypoint, reach: f32) -> Vector3<f32> {
    let local = Vector3::new((0.5 - wrist.x) * reach, (0.5 - wrist.y) * reach, -wrist.z * reach);
    anchor + yaw_rotation(yaw_deg) * local
}

fn yaw_rotation(yaw_deg: f32) -> Rotation3<f32> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), yaw_deg.to_radians())
}

fn joints(hand: Hand) -> (KeypointId, KeypointId, KeypointId) {
    match hand {
        Hand::Left => (KeypointId::LeftShoulder, KeypointId::LeftElbow, KeypointId::LeftWrist),
        Hand::Right => (KeypointId::RightShoulder, KeypointId::RightElbow, KeypointId::RightWrist),
    }
}

fn to_vector(k: &Keypoint) -> Vector3<f32> {
    Vector3::new(k.x, k.y, k.z)
}

// ============================================================================
// DETECTOR
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    hand: Hand,
    position: Vector3<f32>,
    velocity: f32,
    elbow_angle: f32,
}

pub struct PunchDetector {
    left: HandTracker,
    right: HandTracker,
    anchor: Vector3<f32>,

    min_confidence: f32,
    reach: f32,
    radius: f32,
    ratio_threshold: f32,
    priority: PunchPriority,
}

impl PunchDetector {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            left: HandTracker::default(),
            right: HandTracker::default(),
            anchor: Vector3::zeros(),
            min_confidence: config.min_confidence,
            reach: config.arm_reach,
            radius: config.punch_radius,
            ratio_threshold: config.turn_ratio_threshold,
            priority: config.punch_priority,
        }
    }

    pub fn set_anchor(&mut self, anchor: Vector3<f32>) {
        self.anchor = anchor;
    }

    pub fn anchor(&self) -> Vector3<f32> {
        self.anchor
    }

    pub fn tracker(&self, hand: Hand) -> &HandTracker {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    /// Process one frame; at most one punch resolves per frame
    pub fn update(
        &mut self,
        skeleton: &Skeleton,
        now_ms: f64,
        yaw_deg: f32,
        distance_ratio: Option<f32>,
        targets: &HitTargets,
        ctx: &mut SessionContext,
    ) -> Option<GestureEvent> {
        let forward = yaw_rotation(yaw_deg) * Vector3::z();
        let twisted = distance_ratio.is_some_and(|r| r < self.ratio_threshold);
        let velocity_threshold = ctx.profile().punch_velocity_threshold;
        let angle_threshold = ctx.profile().punch_elbow_angle_threshold;

        // Both hands are always tracked so neither carries a stale position
        let [left, right] = [Hand::Left, Hand::Right].map(|hand| {
            self.measure(hand, skeleton, now_ms, yaw_deg, &forward)
                .filter(|c| twisted && c.velocity > velocity_threshold && c.elbow_angle > angle_threshold)
        });

        let chosen = match self.priority {
            PunchPriority::LeftFirst => left.or(right),
            PunchPriority::RightFirst => right.or(left),
            PunchPriority::Fastest => match (left, right) {
                (Some(l), Some(r)) if r.velocity > l.velocity => Some(r),
                (l, r) => l.or(r),
            },
        }?;

        Some(self.fire(chosen, now_ms, targets, ctx))
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    fn measure(
        &mut self,
        hand: Hand,
        skeleton: &Skeleton,
        now_ms: f64,
        yaw_deg: f32,
        forward: &Vector3<f32>,
    ) -> Option<Candidate> {
        let (shoulder_id, elbow_id, wrist_id) = joints(hand);
        let shoulder = skeleton.usable(shoulder_id, self.min_confidence)?;
        let elbow = skeleton.usable(elbow_id, self.min_confidence)?;
        let wrist = skeleton.usable(wrist_id, self.min_confidence)?;

        let position = hand_position(&self.anchor, yaw_deg, wrist, self.reach);
        let tracker = match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        };
        let velocity = tracker.advance(position, forward, now_ms)?;
        let elbow_angle = elbow_deflection_deg(to_vector(shoulder), to_vector(elbow), to_vector(wrist))?;

        Some(Candidate { hand, position, velocity, elbow_angle })
    }

    fn fire(&self, punch: Candidate, now_ms: f64, targets: &HitTargets, ctx: &mut SessionContext) -> GestureEvent {
        let hits: Vec<PunchHit> = targets
            .iter()
            .filter_map(|(kind, object)| {
                let distance = (object.position - punch.position).norm();
                (distance <= self.radius).then_some(PunchHit { kind, handle: object.handle, distance })
            })
            .collect();

        log::debug!(
            "👊 {} punch v={:.2} angle={:.1}° hits={}",
            punch.hand.as_str(),
            punch.velocity,
            punch.elbow_angle,
            hits.len()
        );

        ctx.record_sample(SampleKind::PunchVelocity, punch.velocity);
        ctx.record_sample(SampleKind::PunchElbowAngle, punch.elbow_angle);
        ctx.award_xp(Skill::Punching, 1);

        GestureEvent::new(
            now_ms,
            GestureKind::Punch { hand: punch.hand, position: punch.position, velocity: punch.velocity, hits },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gestures::events::{TargetKind, WorldObject};
    use crate::store::MemoryStore;
    use approx::assert_relative_eq;

    fn context(config: &TrackingConfig) -> SessionContext {
        SessionContext::load(Box::new(MemoryStore::new()), config)
    }

    /// Bent arm (90° deflection) with the wrist at the given depth
    fn arm(skeleton: &mut Skeleton, hand: Hand, wrist_z: f32) {
        let (shoulder, elbow, wrist) = joints(hand);
        skeleton.set(shoulder, Keypoint::new(0.4, 0.3, 0.0, 0.9));
        skeleton.set(elbow, Keypoint::new(0.4, 0.5, 0.0, 0.9));
        skeleton.set(wrist, Keypoint::new(0.5, 0.5, wrist_z, 0.9));
    }

    fn pose(left_z: f32, right_z: f32) -> Skeleton {
        let mut s = Skeleton::new();
        arm(&mut s, Hand::Left, left_z);
        arm(&mut s, Hand::Right, right_z);
        s
    }

    fn punch_hand(event: &GestureEvent) -> Hand {
        match &event.kind {
            GestureKind::Punch { hand, .. } => *hand,
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_hand_position_mirrors_and_rotates() {
        let wrist = Keypoint::new(0.25, 0.5, 0.0, 0.9);
        let p = hand_position(&Vector3::zeros(), 0.0, &wrist, 0.8);
        assert_relative_eq!(p, Vector3::new(0.2, 0.0, 0.0), epsilon = 1e-6);

        let wrist = Keypoint::new(0.5, 0.5, -0.5, 0.9);
        let p = hand_position(&Vector3::new(1.0, 0.0, 0.0), 90.0, &wrist, 0.8);
        assert_relative_eq!(p, Vector3::new(1.4, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_fast_extension_fires_and_hits() {
        let config = TrackingConfig::default();
        let mut ctx = context(&config);
        let mut punch = PunchDetector::new(&config);
        let mut targets = HitTargets::default();
        targets.hostiles.push(WorldObject { handle: 7, position: Vector3::new(0.0, 0.0, 1.0) });
        targets.resources.push(WorldObject { handle: 8, position: Vector3::new(0.0, 0.0, 1.3) });

        assert!(punch.update(&pose(0.0, 0.0), 0.0, 0.0, Some(0.85), &targets, &mut ctx).is_none());
        let mut s = Skeleton::new();
        arm(&mut s, Hand::Left, -0.5);
        let event = punch.update(&s, 100.0, 0.0, Some(0.85), &targets, &mut ctx).unwrap();

        match event.kind {
            GestureKind::Punch { hand, position, velocity, hits } => {
                assert_eq!(hand, Hand::Left);
                assert_relative_eq!(position, Vector3::new(0.0, 0.0, 0.4), epsilon = 1e-6);
                assert_relative_eq!(velocity, 4.0, epsilon = 1e-4);
                assert_eq!(hits.len(), 1);
                assert_eq!(hits[0].kind, TargetKind::Hostile);
                assert_eq!(hits[0].handle, 7);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(ctx.ledger.progress(Skill::Punching).xp, 1);
        assert_eq!(ctx.calibrator.window(SampleKind::PunchVelocity).unwrap().len(), 1);
        assert_eq!(ctx.calibrator.window(SampleKind::PunchElbowAngle).unwrap().len(), 1);
    }

    #[test]
    fn test_untwisted_torso_blocks_punch() {
        let config = TrackingConfig::default();
        let mut ctx = context(&config);
        let mut punch = PunchDetector::new(&config);
        let targets = HitTargets::default();
        punch.update(&pose(0.0, 0.0), 0.0, 0.0, Some(0.95), &targets, &mut ctx);
        assert!(punch.update(&pose(-0.5, 0.0), 100.0, 0.0, Some(0.95), &targets, &mut ctx).is_none());
        // Unknown ratio (still bootstrapping) blocks too
        assert!(punch.update(&pose(-1.0, 0.0), 200.0, 0.0, None, &targets, &mut ctx).is_none());
        assert!(ctx.calibrator.window(SampleKind::PunchVelocity).unwrap().is_empty());
    }

    #[test]
    fn test_slow_or_backward_motion_does_not_fire() {
        let config = TrackingConfig::default();
        let mut ctx = context(&config);
        let mut punch = PunchDetector::new(&config);
        let targets = HitTargets::default();
        punch.update(&pose(0.0, 0.0), 0.0, 0.0, Some(0.8), &targets, &mut ctx);
        // 0.08 units over 100ms = 0.8/s
        assert!(punch.update(&pose(-0.1, 0.0), 100.0, 0.0, Some(0.8), &targets, &mut ctx).is_none());
        assert!(punch.update(&pose(0.5, 0.0), 200.0, 0.0, Some(0.8), &targets, &mut ctx).is_none());
    }

    #[test]
    fn test_straight_arm_does_not_fire() {
        let config = TrackingConfig::default();
        let mut ctx = context(&config);
        let mut punch = PunchDetector::new(&config);
        let targets = HitTargets::default();
        let straight = |z: f32| {
            let mut s = Skeleton::new();
            s.set(KeypointId::LeftShoulder, Keypoint::new(0.5, 0.5, 0.0, 0.9));
            s.set(KeypointId::LeftElbow, Keypoint::new(0.5, 0.5, z / 2.0, 0.9));
            s.set(KeypointId::LeftWrist, Keypoint::new(0.5, 0.5, z, 0.9));
            s
        };
        punch.update(&straight(-0.1), 0.0, 0.0, Some(0.8), &targets, &mut ctx);
        assert!(punch.update(&straight(-0.6), 100.0, 0.0, Some(0.8), &targets, &mut ctx).is_none());
    }

    #[test]
    fn test_priority_tie_break() {
        let targets = HitTargets::default();
        let run = |priority: PunchPriority, left_z: f32, right_z: f32| {
            let config = TrackingConfig { punch_priority: priority, ..Default::default() };
            let mut ctx = context(&config);
            let mut punch = PunchDetector::new(&config);
            punch.update(&pose(0.0, 0.0), 0.0, 0.0, Some(0.8), &targets, &mut ctx);
            let event = punch.update(&pose(left_z, right_z), 100.0, 0.0, Some(0.8), &targets, &mut ctx).unwrap();
            (punch_hand(&event), ctx.ledger.progress(Skill::Punching).xp)
        };

        assert_eq!(run(PunchPriority::LeftFirst, -0.5, -0.9), (Hand::Left, 1));
        assert_eq!(run(PunchPriority::RightFirst, -0.5, -0.9), (Hand::Right, 1));
        assert_eq!(run(PunchPriority::Fastest, -0.5, -0.9), (Hand::Right, 1));
        assert_eq!(run(PunchPriority::Fastest, -0.9, -0.5), (Hand::Left, 1));
        // Only the right qualifies: LeftFirst still falls through to it
        assert_eq!(run(PunchPriority::LeftFirst, 0.0, -0.9), (Hand::Right, 1));
    }

    #[test]
    fn test_missing_joints_skip_hand() {
        let config = TrackingConfig::default();
        let mut ctx = context(&config);
        let mut punch = PunchDetector::new(&config);
        let targets = HitTargets::default();
        punch.update(&pose(0.0, 0.0), 0.0, 0.0, Some(0.8), &targets, &mut ctx);
        let mut s = pose(-0.5, 0.0);
        s.set(KeypointId::LeftElbow, Keypoint::new(0.4, 0.5, 0.0, 0.3));
        assert!(punch.update(&s, 100.0, 0.0, Some(0.8), &targets, &mut ctx).is_none());
        // Previous position survives the skipped frame
        assert!(punch.tracker(Hand::Left).last_position().is_some());
    }

    #[test]
    fn test_reset_forgets_positions() {
        let config = TrackingConfig::default();
        let mut ctx = context(&config);
        let mut punch = PunchDetector::new(&config);
        let targets = HitTargets::default();
        punch.update(&pose(0.0, 0.0), 0.0, 0.0, Some(0.8), &targets, &mut ctx);
        punch.reset();
        // No previous sample, so no velocity and no punch
        assert!(punch.update(&pose(-0.5, 0.0), 100.0, 0.0, Some(0.8), &targets, &mut ctx).is_none());
    }
}
