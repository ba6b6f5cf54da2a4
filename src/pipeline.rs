//! Frame driver: fusion -> smoothing -> turn -> walk -> punch
//!
//! Owns every stage plus the session context. The host feeds one `PoseFrame`
//! per capture tick and gets back the events for that frame.

use nalgebra::Vector3;
use serde::Serialize;

use crate::classifier::{TrainingJob, TrainingOutcome};
use crate::config::TrackingConfig;
use crate::error::GestureResult;
use crate::fusion::{KeypointFusionEngine, PrimarySkeleton, SecondarySkeleton, Skeleton, SmoothingFilter};
use crate::gestures::{GestureEvent, HitTargets, PunchDetector, TargetKind, TurnDetector, WalkDetector, WorldObject};
use crate::session::SessionContext;
use crate::store::KeyValueStore;

/// One capture tick; either source may be missing
#[derive(Clone, Debug, Default)]
pub struct PoseFrame {
    pub timestamp_ms: f64,
    pub primary: Option<PrimarySkeleton>,
    pub secondary: Option<SecondarySkeleton>,
}

impl PoseFrame {
    pub fn new(timestamp_ms: f64) -> Self {
        Self { timestamp_ms, ..Default::default() }
    }

    pub fn with_primary(mut self, primary: PrimarySkeleton) -> Self {
        self.primary = Some(primary);
        self
    }

    pub fn with_secondary(mut self, secondary: SecondarySkeleton) -> Self {
        self.secondary = Some(secondary);
        self
    }
}

/// Result of one frame
#[derive(Debug, Default, Serialize)]
pub struct FrameOutput {
    pub events: Vec<GestureEvent>,
    pub target_yaw: f32,
    /// Retrain pass the host should run off the frame path
    #[serde(skip)]
    pub training_job: Option<TrainingJob>,
}

pub struct GesturePipeline {
    config: TrackingConfig,
    fusion: KeypointFusionEngine,
    smoothing: SmoothingFilter,
    walk: WalkDetector,
    turn: TurnDetector,
    punch: PunchDetector,
    ctx: SessionContext,
    /// Last smoothed skeleton
    skeleton: Skeleton,
    targets: HitTargets,
    motion_enabled: bool,
    /// A frame has run since the last stop
    tracking: bool,
}

impl GesturePipeline {
    pub fn new(config: TrackingConfig, store: Box<dyn KeyValueStore>) -> Self {
        let ctx = SessionContext::load(store, &config);
        Self {
            fusion: KeypointFusionEngine::new(config.min_confidence),
            smoothing: SmoothingFilter::new(config.smoothing_factor),
            walk: WalkDetector::new(&config),
            turn: TurnDetector::new(&config),
            punch: PunchDetector::new(&config),
            ctx,
            skeleton: Skeleton::default(),
            targets: HitTargets::default(),
            motion_enabled: true,
            tracking: false,
            config,
        }
    }

    /// Rebuild every stage for a new config; persisted state reloads from the store.
    /// A retrain job already in flight stays the only one and reports to the new pipeline.
    pub fn reconfigure(self, config: TrackingConfig) -> Self {
        let anchor = self.punch.anchor();
        let targets = self.targets;
        let motion_enabled = self.motion_enabled;
        let schedule = self.ctx.classifier.scheduler().clone();
        let mut next = Self::new(config, self.ctx.into_store());
        next.ctx.classifier.resume_schedule(&schedule);
        next.punch.set_anchor(anchor);
        next.targets = targets;
        next.motion_enabled = motion_enabled;
        next
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.ctx
    }

    pub fn walk(&self) -> &WalkDetector {
        &self.walk
    }

    pub fn turn(&self) -> &TurnDetector {
        &self.turn
    }

    pub fn target_yaw(&self) -> f32 {
        self.turn.target_yaw()
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn is_motion_enabled(&self) -> bool {
        self.motion_enabled
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Run one frame through every stage
    pub fn process_frame(&mut self, frame: &PoseFrame) -> FrameOutput {
        if !self.motion_enabled {
            return FrameOutput { target_yaw: self.turn.target_yaw(), ..Default::default() };
        }
        self.tracking = true;
        let now = frame.timestamp_ms;

        let fused = self.fusion.fuse(frame.primary.as_ref(), frame.secondary.as_ref());
        let skeleton = self.smoothing.apply(&fused);
        self.skeleton = skeleton;

        let mut events = Vec::new();
        events.extend(self.turn.update(&skeleton, now, &mut self.ctx));

        let yaw = self.turn.target_yaw();
        events.extend(self.walk.update(&skeleton, now, yaw, &mut self.ctx));
        events.extend(self.punch.update(
            &skeleton,
            now,
            yaw,
            self.turn.distance_ratio(),
            &self.targets,
            &mut self.ctx,
        ));

        FrameOutput { events, target_yaw: yaw, training_job: self.ctx.poll_training(now) }
    }

    /// Reset timers, bootstrap and smoothing. Returns false when already stopped.
    pub fn stop_tracking(&mut self) -> bool {
        if !self.tracking {
            return false;
        }
        self.fusion.reset();
        self.smoothing.reset();
        self.skeleton = Skeleton::default();
        self.walk.reset();
        self.turn.reset();
        self.punch.reset();
        self.tracking = false;
        log::info!("⏹️ Tracking stopped, detectors reset");
        true
    }

    /// Disabling (e.g. capture lost) also stops tracking
    pub fn set_motion_enabled(&mut self, enabled: bool) {
        if self.motion_enabled == enabled {
            return;
        }
        self.motion_enabled = enabled;
        if !enabled {
            self.stop_tracking();
        }
        log::info!("Motion {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn set_body_anchor(&mut self, anchor: Vector3<f32>) {
        self.punch.set_anchor(anchor);
    }

    pub fn set_targets(&mut self, kind: TargetKind, objects: Vec<WorldObject>) {
        *self.targets.collection_mut(kind) = objects;
    }

    pub fn targets(&self) -> &HitTargets {
        &self.targets
    }

    pub fn start_tutorial(&mut self) {
        self.ctx.start_tutorial();
    }

    /// Human-readable tutorial progress
    pub fn tutorial_status(&self) -> String {
        self.ctx
            .calibrator
            .tutorial()
            .map(|t| t.describe())
            .unwrap_or_else(|| "Tutorial inactive".to_string())
    }

    /// Hand a finished retrain back; returns the accuracy on success
    pub fn complete_training(&mut self, result: GestureResult<TrainingOutcome>) -> Option<f32> {
        self.ctx.complete_training(result)
    }

    /// Run a job on the calling thread (native hosts and tests)
    pub fn run_training_inline(&mut self, job: TrainingJob) -> Option<f32> {
        self.complete_training(job.run())
    }
}
