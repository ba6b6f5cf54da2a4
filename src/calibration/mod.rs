//! Calibration module - adaptive per-player thresholds and guided tutorial
//!
//! Re-exports only. All logic in submodules.

mod profile;
mod tutorial;
mod window;

pub use profile::{
    CalibrationProfile, Calibrator, RecordOutcome, SampleKind, DEFAULT_PUNCH_ELBOW_ANGLE,
    DEFAULT_PUNCH_VELOCITY, DEFAULT_SHOULDER_DISTANCE, DEFAULT_WALKING_CADENCE,
};
pub use tutorial::{StepStatus, TutorialAction, TutorialProgress, TutorialState, TutorialStep};
pub use window::{SampleWindow, WINDOW_CAPACITY};
