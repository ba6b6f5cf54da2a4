//! Online classifier - queue, model and retrain schedule together
//!
//! The frame path only ingests examples and polls for a job. The completion
//! call is the only other writer of classifier state.

use super::buffer::TrainingQueue;
use super::features::{GestureLabel, TrainingExample, FEATURE_COUNT};
use super::model::ClassifierModel;
use super::retrain::{RetrainScheduler, RetrainState, TrainingJob, TrainingOutcome};
use crate::config::TrackingConfig;
use crate::error::GestureResult;
use crate::experience::{ExperienceLedger, Skill};
use crate::store::{load_or_default, persist, KeyValueStore, MODEL_KEY, TRAINING_QUEUE_KEY};

/// Training XP at 100% accuracy
pub const TRAINING_XP_SCALE: f32 = 10.0;

pub struct OnlineClassifier {
    queue: TrainingQueue,
    model: ClassifierModel,
    scheduler: RetrainScheduler,
    epochs: usize,
    learning_rate: f32,
    last_accuracy: Option<f32>,
}

impl OnlineClassifier {
    pub fn new(config: &TrackingConfig) -> Self {
        Self::with_state(TrainingQueue::new(config.training_queue_capacity), ClassifierModel::new(), config)
    }

    /// Restore queue and model, defaulting on absence or corruption
    pub fn load(store: &dyn KeyValueStore, config: &TrackingConfig) -> Self {
        let queue: TrainingQueue = load_or_default(store, TRAINING_QUEUE_KEY);
        let model: ClassifierModel = load_or_default(store, MODEL_KEY);
        Self::with_state(queue, model, config)
    }

    fn with_state(mut queue: TrainingQueue, model: ClassifierModel, config: &TrackingConfig) -> Self {
        queue.set_capacity(config.training_queue_capacity);
        Self {
            queue,
            model,
            scheduler: RetrainScheduler::new(config.retrain_interval_ms, config.retrain_min_examples),
            epochs: config.training_epochs,
            learning_rate: config.learning_rate,
            last_accuracy: None,
        }
    }

    pub fn queue(&self) -> &TrainingQueue {
        &self.queue
    }

    pub fn model(&self) -> &ClassifierModel {
        &self.model
    }

    pub fn state(&self) -> RetrainState {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &RetrainScheduler {
        &self.scheduler
    }

    pub fn last_accuracy(&self) -> Option<f32> {
        self.last_accuracy
    }

    pub fn predict(&self, features: &[f32; FEATURE_COUNT]) -> (GestureLabel, f32) {
        self.model.predict(features)
    }

    /// Queue an example and ask for a retrain
    pub fn ingest(&mut self, example: TrainingExample, store: &mut dyn KeyValueStore) {
        self.queue.push(example);
        persist(store, TRAINING_QUEUE_KEY, &self.queue);
        self.scheduler.request();
    }

    /// Start a job if the schedule allows it
    pub fn poll(&mut self, now_ms: f64) -> Option<TrainingJob> {
        if !self.scheduler.try_start(now_ms, self.queue.len()) {
            return None;
        }
        log::debug!("Retraining on {} examples", self.queue.len());
        Some(TrainingJob::new(self.queue.snapshot(), self.model.clone(), self.epochs, self.learning_rate))
    }

    /// Continue the retrain schedule of the classifier this one replaces.
    /// A job started under `previous` stays the single one in flight and its
    /// completion lands here.
    pub fn resume_schedule(&mut self, previous: &RetrainScheduler) {
        self.scheduler.inherit(previous);
    }

    /// Apply a finished job. Returns the accuracy when the pass succeeded.
    pub fn complete(
        &mut self,
        result: GestureResult<TrainingOutcome>,
        ledger: &mut ExperienceLedger,
        store: &mut dyn KeyValueStore,
    ) -> Option<f32> {
        match result {
            Ok(outcome) => {
                self.model = outcome.model;
                self.last_accuracy = Some(outcome.accuracy);
                persist(store, MODEL_KEY, &self.model);

                let xp = (outcome.accuracy * TRAINING_XP_SCALE).round() as u32;
                ledger.award(Skill::Training, xp, store);
                log::info!(
                    "🧠 Classifier pass {} on {} examples: accuracy {:.2}",
                    self.model.passes(),
                    outcome.example_count,
                    outcome.accuracy
                );
                if self.scheduler.finish(false) {
                    log::debug!("Coalesced retrain pending");
                }
                Some(outcome.accuracy)
            }
            Err(e) => {
                log::warn!("Training pass failed: {}", e);
                self.scheduler.finish(true);
                None
            }
        }
    }
}
