//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod landmarks;
mod session;
mod storage;

pub use landmarks::{update_hit_targets, update_landmarks, update_secondary_keypoints};
pub use session::{
    configure, get_target_yaw, process_frame, set_body_anchor, set_motion_enabled, start_tutorial,
    stop_tracking, tutorial_status,
};
pub use storage::LocalStorageStore;
