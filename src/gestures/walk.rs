//! Walk-in-place detection
//!
//! Each leg is an Idle/Raised state machine on kneeHeight = knee.y - hip.y
//! (image y grows downward, so a raised knee goes negative).
//! When no knee is visible but the hips are, the hip centre's rise above its
//! rest level (mean of recent frames) drives a third machine with the same
//! semantics.
//!
//! | state  | signal              | cooldown elapsed | next   | step |
//! |--------|---------------------|------------------|--------|------|
//! | Idle   | raised              | yes              | Raised | yes  |
//! | Idle   | raised              | no               | Idle   | no   |
//! | Raised | lowered             | -                | Idle   | no   |
//! | *      | otherwise           | -                | same   | no   |

use super::events::{heading, GestureEvent, GestureKind};
use crate::calibration::{SampleKind, SampleWindow};
use crate::config::TrackingConfig;
use crate::experience::Skill;
use crate::fusion::{KeypointId, Skeleton};
use crate::session::SessionContext;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LegState {
    #[default]
    Idle,
    Raised,
}

/// Which signal produced the last step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepSource {
    LeftKnee,
    RightKnee,
    Hips,
}

pub struct WalkDetector {
    left: LegState,
    right: LegState,
    hips: LegState,
    /// Recent hip-centre heights
    hip_rest: SampleWindow,
    last_step_ms: Option<f64>,
    /// Accepted steps since the last mile bonus
    steps_toward_mile: u32,
    total_steps: u64,
    last_source: Option<StepSource>,

    min_confidence: f32,
    knee_threshold: f32,
    hip_threshold: f32,
    cooldown_ms: f64,
    speed: f32,
    mile_steps: u32,
    mile_bonus_xp: u32,
}

impl WalkDetector {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            left: LegState::Idle,
            right: LegState::Idle,
            hips: LegState::Idle,
            hip_rest: SampleWindow::new(config.hip_rest_frames),
            last_step_ms: None,
            steps_toward_mile: 0,
            total_steps: 0,
            last_source: None,
            min_confidence: config.min_confidence,
            knee_threshold: config.knee_raise_threshold,
            hip_threshold: config.hip_oscillation_threshold,
            cooldown_ms: config.step_cooldown_ms,
            speed: config.step_speed,
            mile_steps: config.stride_mile_steps.max(1),
            mile_bonus_xp: config.stride_mile_bonus_xp,
        }
    }

    pub fn leg_states(&self) -> (LegState, LegState) {
        (self.left, self.right)
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn last_source(&self) -> Option<StepSource> {
        self.last_source
    }

    pub fn last_step_ms(&self) -> Option<f64> {
        self.last_step_ms
    }

    /// Process one frame; at most one step per frame
    pub fn update(
        &mut self,
        skeleton: &Skeleton,
        now_ms: f64,
        yaw_deg: f32,
        ctx: &mut SessionContext,
    ) -> Option<GestureEvent> {
        let left_hip = skeleton.usable(KeypointId::LeftHip, self.min_confidence).copied();
        let right_hip = skeleton.usable(KeypointId::RightHip, self.min_confidence).copied();
        let left_knee = skeleton.usable(KeypointId::LeftKnee, self.min_confidence).copied();
        let right_knee = skeleton.usable(KeypointId::RightKnee, self.min_confidence).copied();

        let left_height = left_knee.zip(left_hip).map(|(k, h)| k.y - h.y);
        let right_height = right_knee.zip(right_hip).map(|(k, h)| k.y - h.y);

        let hip_y = match (left_hip, right_hip) {
            (Some(l), Some(r)) => Some((l.y + r.y) * 0.5),
            (Some(h), None) | (None, Some(h)) => Some(h.y),
            (None, None) => None,
        };

        let mut source = None;
        if left_height.is_some() || right_height.is_some() {
            // One step per frame: a left step blocks the right leg this frame
            let mut cooldown_ok = self.cooldown_elapsed(now_ms);
            if let Some(h) = left_height {
                if self.step_leg(Side::Left, h, cooldown_ok) {
                    source = Some(StepSource::LeftKnee);
                    cooldown_ok = false;
                }
            }
            if let Some(h) = right_height {
                if self.step_leg(Side::Right, h, cooldown_ok) {
                    source = Some(StepSource::RightKnee);
                }
            }
        } else if let Some(y) = hip_y {
            if self.step_hips(y, now_ms) {
                source = Some(StepSource::Hips);
            }
        }

        if let Some(y) = hip_y {
            self.hip_rest.push(y);
        }

        let source = source?;
        Some(self.accept_step(source, now_ms, yaw_deg, ctx))
    }

    /// Forget timers and leg states (tracking stopped)
    pub fn reset(&mut self) {
        self.left = LegState::Idle;
        self.right = LegState::Idle;
        self.hips = LegState::Idle;
        self.hip_rest.clear();
        self.last_step_ms = None;
        self.last_source = None;
    }

    fn cooldown_elapsed(&self, now_ms: f64) -> bool {
        self.last_step_ms.map_or(true, |last| now_ms - last >= self.cooldown_ms)
    }

    fn step_leg(&mut self, side: Side, knee_height: f32, cooldown_ok: bool) -> bool {
        let raised = knee_height < self.knee_threshold;
        let state = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        let (next, step) = transition(*state, raised, !raised, cooldown_ok);
        *state = next;
        step
    }

    fn step_hips(&mut self, hip_y: f32, now_ms: f64) -> bool {
        let Some(rest) = self.hip_rest.mean() else {
            return false;
        };
        let rising = hip_y - rest < -self.hip_threshold;
        let (next, step) = transition(self.hips, rising, !rising, self.cooldown_elapsed(now_ms));
        self.hips = next;
        step
    }

    fn accept_step(
        &mut self,
        source: StepSource,
        now_ms: f64,
        yaw_deg: f32,
        ctx: &mut SessionContext,
    ) -> GestureEvent {
        let previous = self.last_step_ms.replace(now_ms);
        self.last_source = Some(source);
        self.total_steps += 1;

        if let Some(prev) = previous {
            let cadence_s = ((now_ms - prev) / 1000.0) as f32;
            ctx.record_sample(SampleKind::Walk, cadence_s);
        }

        ctx.award_xp(Skill::Walking, 1);
        self.steps_toward_mile += 1;
        if self.steps_toward_mile >= self.mile_steps {
            self.steps_toward_mile = 0;
            log::info!("🚶 Stride mile reached, +{} XP", self.mile_bonus_xp);
            ctx.award_xp(Skill::Walking, self.mile_bonus_xp);
        }

        GestureEvent::new(now_ms, GestureKind::Step { impulse: heading(yaw_deg) * self.speed })
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Idle/Raised transition table. Returns (next state, step accepted).
fn transition(state: LegState, raised: bool, lowered: bool, cooldown_ok: bool) -> (LegState, bool) {
    match state {
        LegState::Idle if raised && cooldown_ok => (LegState::Raised, true),
        LegState::Raised if lowered => (LegState::Idle, false),
        other => (other, false),
    }
}
