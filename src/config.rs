//! Tunable constants for tracking, detection and calibration
//!
//! Defaults are the shipped tuning. Hosts may override any subset from JSON;
//! missing fields keep their default.

use serde::{Deserialize, Serialize};

use crate::error::GestureResult;

/// Which hand wins when both qualify for a punch in the same frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunchPriority {
    #[default]
    LeftFirst,
    RightFirst,
    /// Higher forward velocity wins
    Fastest,
}

/// All tracking parameters in one place
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    // --- fusion / smoothing ---
    /// Confidence a keypoint must strictly exceed to be used
    pub min_confidence: f32,
    /// EMA weight on the previous value
    pub smoothing_factor: f32,

    // --- walk ---
    /// kneeHeight (knee.y - hip.y) below this counts as a raised knee
    pub knee_raise_threshold: f32,
    /// Hip rise above its rest level that counts as a step when knees are not visible
    pub hip_oscillation_threshold: f32,
    /// Frames of hip height averaged into that rest level
    pub hip_rest_frames: usize,
    /// Minimum time between accepted steps
    pub step_cooldown_ms: f64,
    /// Magnitude of each step impulse
    pub step_speed: f32,
    /// Accepted steps that make up one bonus "mile"
    pub stride_mile_steps: u32,
    pub stride_mile_bonus_xp: u32,

    // --- turn ---
    pub bootstrap_samples: usize,
    /// distance / baseline below this means the torso is twisted
    pub turn_ratio_threshold: f32,
    /// Below this the ±90° clamp is lifted
    pub deep_turn_ratio_threshold: f32,
    /// Yaw degrees per frame at intensity 1.0
    pub turn_gain_deg: f32,
    pub yaw_clamp_deg: f32,
    pub deep_yaw_clamp_deg: f32,

    // --- punch ---
    pub arm_reach: f32,
    pub punch_radius: f32,
    pub punch_priority: PunchPriority,

    // --- calibration / training ---
    pub sample_window_capacity: usize,
    pub tutorial_target_count: u32,
    pub training_queue_capacity: usize,
    pub retrain_interval_ms: f64,
    pub retrain_min_examples: usize,
    pub training_epochs: usize,
    pub learning_rate: f32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            smoothing_factor: 0.7,
            knee_raise_threshold: -0.05,
            hip_oscillation_threshold: 0.02,
            hip_rest_frames: 30,
            step_cooldown_ms: 300.0,
            step_speed: 1.0,
            stride_mile_steps: 2112,
            stride_mile_bonus_xp: 100,
            bootstrap_samples: 10,
            turn_ratio_threshold: 0.9,
            deep_turn_ratio_threshold: 0.5,
            turn_gain_deg: 3.0,
            yaw_clamp_deg: 90.0,
            deep_yaw_clamp_deg: 180.0,
            arm_reach: 0.8,
            punch_radius: 0.8,
            punch_priority: PunchPriority::LeftFirst,
            sample_window_capacity: 100,
            tutorial_target_count: 10,
            training_queue_capacity: 1000,
            retrain_interval_ms: 5000.0,
            retrain_min_examples: 10,
            training_epochs: 60,
            learning_rate: 0.5,
        }
    }
}

impl TrackingConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults
    pub fn from_json(json: &str) -> GestureResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = TrackingConfig::from_json(r#"{"step_cooldown_ms": 450.0, "punch_priority": "fastest"}"#)
            .unwrap();
        assert_eq!(config.step_cooldown_ms, 450.0);
        assert_eq!(config.punch_priority, PunchPriority::Fastest);
        assert_eq!(config.smoothing_factor, 0.7);
        assert_eq!(config.stride_mile_steps, 2112);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(TrackingConfig::from_json("{not json").is_err());
    }
}
