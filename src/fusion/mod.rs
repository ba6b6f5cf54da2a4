//! Fusion module - canonical skeleton from two pose sources
//!
//! Re-exports only. All logic in submodules.

mod engine;
mod keypoints;
mod smoothing;
mod sources;

pub use engine::KeypointFusionEngine;
pub use keypoints::{FusedSkeleton, Keypoint, KeypointId, Skeleton, KEYPOINT_COUNT};
pub use smoothing::SmoothingFilter;
pub use sources::{
    canonical_secondary_id, PrimaryLandmark, PrimarySkeleton, SecondaryKeypoint,
    SecondarySkeleton, PRIMARY_LANDMARK_COUNT, PRIMARY_STRIDE, SECONDARY_REMAP,
    SECONDARY_STRIDE,
};
