//! Classifier module - online softmax model trained from calibration samples
//!
//! Rust owns the queue, the model and the retrain schedule. Training passes
//! run as detached jobs so the frame path never waits on a fit.

mod buffer;
mod features;
mod model;
mod online;
mod retrain;

pub use buffer::{TrainingQueue, QUEUE_CAPACITY};
pub use features::{
    extract_features, GestureLabel, TrainingExample, CLASS_COUNT, FEATURE_COUNT, GESTURE_LABELS,
};
pub use model::ClassifierModel;
pub use online::{OnlineClassifier, TRAINING_XP_SCALE};
pub use retrain::{RetrainScheduler, RetrainState, TrainingJob, TrainingOutcome};
