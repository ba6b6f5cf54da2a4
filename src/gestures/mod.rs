//! Gesture module - walk, turn and punch detectors over the fused skeleton
//!
//! Re-exports only. All logic in submodules.

mod angles;
mod events;
mod punch;
mod turn;
mod walk;

pub use angles::elbow_deflection_deg;
pub use events::{heading, GestureEvent, GestureKind, Hand, HitTargets, PunchHit, TargetKind, WorldObject};
pub use punch::{hand_position, HandTracker, PunchDetector};
pub use turn::{TurnDetector, TurnDirection, TurnPhase};
pub use walk::{LegState, StepSource, WalkDetector};
