//! Landmark intake from JavaScript
//!
//! Both pose models push flat Float32Arrays whenever they produce a result.
//! The latest of each is held until the next `process_frame` consumes it, so
//! a source that did not report since the last frame is absent for that frame.

use std::cell::RefCell;

use nalgebra::Vector3;
use wasm_bindgen::prelude::*;

use crate::fusion::{PrimarySkeleton, SecondarySkeleton, PRIMARY_LANDMARK_COUNT, PRIMARY_STRIDE};
use crate::gestures::{TargetKind, WorldObject};
use crate::pipeline::PoseFrame;

use super::session::with_pipeline;

/// Values per hit target: handle, x, y, z
const TARGET_STRIDE: usize = 4;

#[derive(Default)]
struct PendingInput {
    primary: Option<PrimarySkeleton>,
    secondary: Option<SecondarySkeleton>,
}

// Thread-local storage (WASM is single-threaded)
thread_local! {
    static PENDING: RefCell<PendingInput> = RefCell::new(PendingInput::default());
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Primary model output: 33 landmarks × (x, y, z, visibility)
#[wasm_bindgen]
pub fn update_landmarks(data: &[f32]) {
    match PrimarySkeleton::from_flat(data) {
        Ok(skeleton) => PENDING.with(|cell| cell.borrow_mut().primary = Some(skeleton)),
        Err(e) => log::warn!(
            "Invalid landmark data ({} values, expected {}): {}",
            data.len(),
            PRIMARY_LANDMARK_COUNT * PRIMARY_STRIDE,
            e
        ),
    }
}

/// Secondary model output: n keypoints × (x, y, id, score) in pixels
#[wasm_bindgen]
pub fn update_secondary_keypoints(data: &[f32], frame_width: f32, frame_height: f32) {
    match SecondarySkeleton::from_flat(data, frame_width, frame_height) {
        Ok(skeleton) => PENDING.with(|cell| cell.borrow_mut().secondary = Some(skeleton)),
        Err(e) => log::warn!("Invalid secondary keypoints: {}", e),
    }
}

/// Replace one hit-test collection: n objects × (handle, x, y, z)
#[wasm_bindgen]
pub fn update_hit_targets(kind: &str, data: &[f32]) {
    let Some(kind) = TargetKind::from_name(kind) else {
        log::warn!("Unknown target collection '{}'", kind);
        return;
    };
    if data.len() % TARGET_STRIDE != 0 {
        log::warn!("Hit target data length {} is not a multiple of {}", data.len(), TARGET_STRIDE);
        return;
    }

    let objects = data
        .chunks_exact(TARGET_STRIDE)
        .map(|c| WorldObject { handle: c[0] as u64, position: Vector3::new(c[1], c[2], c[3]) })
        .collect();
    with_pipeline(|pipeline| pipeline.set_targets(kind, objects));
}

// ============================================================================
// INTERNAL API (no wasm_bindgen)
// ============================================================================

/// Drain whatever arrived since the last frame
pub fn take_frame(timestamp_ms: f64) -> PoseFrame {
    PENDING.with(|cell| {
        let mut pending = cell.borrow_mut();
        PoseFrame {
            timestamp_ms,
            primary: pending.primary.take(),
            secondary: pending.secondary.take(),
        }
    })
}

/// Drop buffered input (tracking stopped)
pub fn clear_pending() {
    PENDING.with(|cell| *cell.borrow_mut() = PendingInput::default());
}
