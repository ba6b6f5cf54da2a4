//! Pose Control Web - body-tracked locomotion and punching
//!
//! Fuses two pose-estimation sources into one skeleton, detects walking in
//! place, torso turns and punches, and adapts its thresholds to the player.
//!
//! Entry point for the WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen start/logging hooks
//! - Re-exports for native hosts and tests

mod bridge;
pub mod calibration;
pub mod classifier;
pub mod config;
pub mod error;
pub mod experience;
pub mod fusion;
pub mod gestures;
pub mod pipeline;
pub mod session;
pub mod store;

use wasm_bindgen::prelude::*;

// Re-export wasm_bindgen functions for JS access
pub use bridge::{
    configure, get_target_yaw, process_frame, set_body_anchor, set_motion_enabled, start_tutorial,
    stop_tracking, tutorial_status, update_hit_targets, update_landmarks, update_secondary_keypoints,
    LocalStorageStore,
};

pub use config::{PunchPriority, TrackingConfig};
pub use error::{GestureError, GestureResult, StoreError};
pub use gestures::{GestureEvent, GestureKind, Hand};
pub use pipeline::{FrameOutput, GesturePipeline, PoseFrame};
pub use session::SessionContext;
pub use store::{KeyValueStore, MemoryStore};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Route `log` records to the browser console.
/// Level: "trace", "debug", "info", "warn" or "error" (default info).
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "info" => log::Level::Info,
        "warn" => log::Level::Warn,
        "error" => log::Level::Error,
        _ => log::Level::Info,
    };

    wasm_logger::init(wasm_logger::Config::new(log_level));
    log::info!("✅ Pose control initialized with log level: {}", level);
}
