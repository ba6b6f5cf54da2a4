//! Pipeline entry points for JavaScript
//!
//! One `GesturePipeline` per page, held thread-locally. Retrain jobs are
//! spawned onto the JS event loop and report back into the same pipeline.

use std::cell::RefCell;

use nalgebra::Vector3;
use wasm_bindgen::prelude::*;

use crate::config::TrackingConfig;
use crate::pipeline::GesturePipeline;
use crate::store::{KeyValueStore, MemoryStore};

use super::landmarks::{clear_pending, take_frame};
use super::storage::LocalStorageStore;

// Thread-local storage (WASM is single-threaded)
thread_local! {
    static PIPELINE: RefCell<Option<GesturePipeline>> = const { RefCell::new(None) };
}

fn open_store() -> Box<dyn KeyValueStore> {
    match LocalStorageStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("⚠️ {}, progress will not survive a reload", e);
            Box::new(MemoryStore::new())
        }
    }
}

/// Run `f` against the page's pipeline, creating it on first use
pub fn with_pipeline<R>(f: impl FnOnce(&mut GesturePipeline) -> R) -> R {
    PIPELINE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let pipeline = slot.get_or_insert_with(|| GesturePipeline::new(TrackingConfig::default(), open_store()));
        f(pipeline)
    })
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Run one frame over the landmarks received since the last call.
/// Returns the frame's events as JSON.
#[wasm_bindgen]
pub fn process_frame(timestamp_ms: f64) -> String {
    let frame = take_frame(timestamp_ms);
    let mut output = with_pipeline(|pipeline| pipeline.process_frame(&frame));

    if let Some(job) = output.training_job.take() {
        log::debug!("🧠 Retraining on {} examples", job.example_count());
        wasm_bindgen_futures::spawn_local(async move {
            let result = job.run();
            if let Some(accuracy) = with_pipeline(|pipeline| pipeline.complete_training(result)) {
                log::info!("🧠 Classifier retrained, accuracy {:.0}%", accuracy * 100.0);
            }
        });
    }

    serde_json::to_string(&output).unwrap_or_else(|e| {
        log::warn!("Serializing frame output failed: {}", e);
        "{\"events\":[]}".to_string()
    })
}

#[wasm_bindgen]
pub fn get_target_yaw() -> f32 {
    with_pipeline(|pipeline| pipeline.target_yaw())
}

#[wasm_bindgen]
pub fn start_tutorial() {
    with_pipeline(|pipeline| pipeline.start_tutorial());
}

#[wasm_bindgen]
pub fn tutorial_status() -> String {
    with_pipeline(|pipeline| pipeline.tutorial_status())
}

/// Safe to call repeatedly
#[wasm_bindgen]
pub fn stop_tracking() {
    clear_pending();
    with_pipeline(|pipeline| pipeline.stop_tracking());
}

/// Called with false when the camera is unavailable
#[wasm_bindgen]
pub fn set_motion_enabled(enabled: bool) {
    if !enabled {
        clear_pending();
    }
    with_pipeline(|pipeline| pipeline.set_motion_enabled(enabled));
}

#[wasm_bindgen]
pub fn set_body_anchor(x: f32, y: f32, z: f32) {
    with_pipeline(|pipeline| pipeline.set_body_anchor(Vector3::new(x, y, z)));
}

/// Apply a (partial) JSON config override. Invalid JSON keeps the current config.
#[wasm_bindgen]
pub fn configure(json: &str) -> bool {
    let config = match TrackingConfig::from_json(json) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring config: {}", e);
            return false;
        }
    };
    PIPELINE.with(|cell| {
        let mut slot = cell.borrow_mut();
        let next = match slot.take() {
            Some(pipeline) => pipeline.reconfigure(config),
            None => GesturePipeline::new(config, open_store()),
        };
        *slot = Some(next);
    });
    log::info!("⚙️ Tracking config applied");
    true
}
