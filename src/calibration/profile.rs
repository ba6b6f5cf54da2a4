//! Personalized thresholds that follow the player's recorded samples
//!
//! Outside a tutorial every sample triggers a recompute (window mean, or the
//! built-in default for an empty window) followed by a save. During a
//! tutorial samples are only collected; the recompute happens once the last
//! step completes.
//!
//! A profile that was saved before (`last_updated > 0`) seeds each window
//! with its stored value, so a new session refines it instead of starting
//! over from the defaults.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::tutorial::{TutorialAction, TutorialProgress, TutorialState};
use super::window::SampleWindow;
use crate::config::TrackingConfig;
use crate::error::GestureError;
use crate::store::{persist, KeyValueStore, PROFILE_KEY};

// ============================================================================
// DEFAULTS
// ============================================================================

pub const DEFAULT_SHOULDER_DISTANCE: f32 = 0.25;
/// World units per second along the forward axis
pub const DEFAULT_PUNCH_VELOCITY: f32 = 1.5;
/// Degrees of deflection between upper arm and forearm
pub const DEFAULT_PUNCH_ELBOW_ANGLE: f32 = 20.0;
/// Seconds between steps
pub const DEFAULT_WALKING_CADENCE: f32 = 0.6;

// ============================================================================
// SAMPLE KINDS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    ShoulderDistance,
    Walk,
    Turn,
    PunchVelocity,
    PunchElbowAngle,
}

impl SampleKind {
    pub const ALL: [SampleKind; 5] = [
        SampleKind::ShoulderDistance,
        SampleKind::Walk,
        SampleKind::Turn,
        SampleKind::PunchVelocity,
        SampleKind::PunchElbowAngle,
    ];

    /// Stable index used as a classifier feature
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SampleKind::ShoulderDistance => "shoulderDistance",
            SampleKind::Walk => "walk",
            SampleKind::Turn => "turn",
            SampleKind::PunchVelocity => "punchVelocity",
            SampleKind::PunchElbowAngle => "punchElbowAngle",
        }
    }

    /// Tutorial step this kind advances, if any
    pub fn tutorial_action(self) -> Option<TutorialAction> {
        match self {
            SampleKind::Walk => Some(TutorialAction::Walk),
            SampleKind::Turn => Some(TutorialAction::Turn),
            SampleKind::PunchVelocity => Some(TutorialAction::Punch),
            SampleKind::ShoulderDistance | SampleKind::PunchElbowAngle => None,
        }
    }
}

impl FromStr for SampleKind {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SampleKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| GestureError::UnknownSampleKind(s.to_string()))
    }
}

// ============================================================================
// PERSISTED PROFILE
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalibrationProfile {
    pub baseline_shoulder_distance: f32,
    pub punch_velocity_threshold: f32,
    pub punch_elbow_angle_threshold: f32,
    pub walking_cadence: f32,
    /// UTC epoch milliseconds of the last recompute
    pub last_updated: i64,
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self {
            baseline_shoulder_distance: DEFAULT_SHOULDER_DISTANCE,
            punch_velocity_threshold: DEFAULT_PUNCH_VELOCITY,
            punch_elbow_angle_threshold: DEFAULT_PUNCH_ELBOW_ANGLE,
            walking_cadence: DEFAULT_WALKING_CADENCE,
            last_updated: 0,
        }
    }
}

/// What happened to one recorded sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordOutcome {
    pub tutorial: TutorialProgress,
    pub recomputed: bool,
}

// ============================================================================
// CALIBRATOR
// ============================================================================

/// Runtime owner of the profile, its sample windows and the tutorial
pub struct Calibrator {
    profile: CalibrationProfile,
    shoulder_distance: SampleWindow,
    punch_velocity: SampleWindow,
    punch_elbow_angle: SampleWindow,
    walking_cadence: SampleWindow,
    tutorial: Option<TutorialState>,
    tutorial_target: u32,
}

impl Calibrator {
    pub fn new(profile: CalibrationProfile, config: &TrackingConfig) -> Self {
        let capacity = config.sample_window_capacity;
        let mut calibrator = Self {
            profile,
            shoulder_distance: SampleWindow::new(capacity),
            punch_velocity: SampleWindow::new(capacity),
            punch_elbow_angle: SampleWindow::new(capacity),
            walking_cadence: SampleWindow::new(capacity),
            tutorial: None,
            tutorial_target: config.tutorial_target_count,
        };
        if calibrator.profile.last_updated > 0 {
            calibrator.seed_from_profile();
        }
        calibrator
    }

    fn seed_from_profile(&mut self) {
        let p = &self.profile;
        self.shoulder_distance.push(p.baseline_shoulder_distance);
        self.punch_velocity.push(p.punch_velocity_threshold);
        self.punch_elbow_angle.push(p.punch_elbow_angle_threshold);
        self.walking_cadence.push(p.walking_cadence);
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    pub fn tutorial(&self) -> Option<&TutorialState> {
        self.tutorial.as_ref()
    }

    pub fn window(&self, kind: SampleKind) -> Option<&SampleWindow> {
        match kind {
            SampleKind::ShoulderDistance => Some(&self.shoulder_distance),
            SampleKind::Walk => Some(&self.walking_cadence),
            SampleKind::PunchVelocity => Some(&self.punch_velocity),
            SampleKind::PunchElbowAngle => Some(&self.punch_elbow_angle),
            SampleKind::Turn => None,
        }
    }

    fn window_mut(&mut self, kind: SampleKind) -> Option<&mut SampleWindow> {
        match kind {
            SampleKind::ShoulderDistance => Some(&mut self.shoulder_distance),
            SampleKind::Walk => Some(&mut self.walking_cadence),
            SampleKind::PunchVelocity => Some(&mut self.punch_velocity),
            SampleKind::PunchElbowAngle => Some(&mut self.punch_elbow_angle),
            SampleKind::Turn => None,
        }
    }

    /// Reset and activate the guided tutorial
    pub fn start_tutorial(&mut self) {
        self.tutorial = Some(TutorialState::new(self.tutorial_target));
        log::info!("🎓 Calibration tutorial started");
    }

    pub fn record_sample(&mut self, kind: SampleKind, value: f32, store: &mut dyn KeyValueStore) -> RecordOutcome {
        if let Some(window) = self.window_mut(kind) {
            window.push(value);
        }

        let Some(tutorial) = self.tutorial.as_mut() else {
            self.recompute(store);
            return RecordOutcome { tutorial: TutorialProgress::Ignored, recomputed: true };
        };

        let progress = match kind.tutorial_action() {
            Some(action) => tutorial.advance(action),
            None => TutorialProgress::Ignored,
        };

        match progress {
            TutorialProgress::StepCompleted(action) => {
                log::info!("🎓 Tutorial step '{}' complete: {}", action.as_str(), tutorial.describe());
            }
            TutorialProgress::Finished => {
                log::info!("🎓 Tutorial finished, recalibrating");
                self.tutorial = None;
                self.recompute(store);
                return RecordOutcome { tutorial: progress, recomputed: true };
            }
            TutorialProgress::Counted { .. } | TutorialProgress::Ignored => {}
        }

        RecordOutcome { tutorial: progress, recomputed: false }
    }

    /// Store a freshly bootstrapped shoulder baseline
    pub fn seed_baseline(&mut self, distance: f32, store: &mut dyn KeyValueStore) {
        self.shoulder_distance.push(distance);
        self.profile.baseline_shoulder_distance = distance;
        self.profile.last_updated = chrono::Utc::now().timestamp_millis();
        persist(store, PROFILE_KEY, &self.profile);
    }

    /// Most recent value per metric, falling back to the profile
    pub fn latest(&self) -> [f32; 4] {
        [
            self.shoulder_distance.last().unwrap_or(self.profile.baseline_shoulder_distance),
            self.punch_velocity.last().unwrap_or(self.profile.punch_velocity_threshold),
            self.punch_elbow_angle.last().unwrap_or(self.profile.punch_elbow_angle_threshold),
            self.walking_cadence.last().unwrap_or(self.profile.walking_cadence),
        ]
    }

    fn recompute(&mut self, store: &mut dyn KeyValueStore) {
        self.profile.baseline_shoulder_distance =
            self.shoulder_distance.mean().unwrap_or(DEFAULT_SHOULDER_DISTANCE);
        self.profile.punch_velocity_threshold = self.punch_velocity.mean().unwrap_or(DEFAULT_PUNCH_VELOCITY);
        self.profile.punch_elbow_angle_threshold =
            self.punch_elbow_angle.mean().unwrap_or(DEFAULT_PUNCH_ELBOW_ANGLE);
        self.profile.walking_cadence = self.walking_cadence.mean().unwrap_or(DEFAULT_WALKING_CADENCE);
        self.profile.last_updated = chrono::Utc::now().timestamp_millis();
        log::debug!("Profile recomputed: {:?}", self.profile);
        persist(store, PROFILE_KEY, &self.profile);
    }
}
