//! Error types for the gesture pipeline
//!
//! Every fault class the pipeline can hit maps to one variant. None of them
//! are fatal: the per-frame surface logs and absorbs them, so these only
//! travel between internal components.

use thiserror::Error;

/// Convenient `Result` alias used by fallible internals.
pub type GestureResult<T> = Result<T, GestureError>;

/// Top-level error type for the gesture pipeline.
#[derive(Debug, Error)]
pub enum GestureError {
    /// Missing or low-confidence input that a component could not use.
    #[error("Input fault: {0}")]
    Input(String),

    /// Unrecognized sample kind passed to the calibration profile.
    #[error("Unknown sample kind '{0}'")]
    UnknownSampleKind(String),

    /// Unrecognized skill passed to the experience ledger.
    #[error("Unknown skill '{0}'")]
    UnknownSkill(String),

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed batch or a fit that produced unusable weights.
    #[error("Training fault: {0}")]
    Training(String),
}

/// Errors raised by a [`crate::store::KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is not reachable (e.g. `localStorage` disabled).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the write (quota, permissions).
    #[error("write to '{key}' rejected: {reason}")]
    WriteRejected {
        /// Key being written.
        key: String,
        /// Backend-supplied reason.
        reason: String,
    },
}
