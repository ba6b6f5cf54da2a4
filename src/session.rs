//! Session context handed to every detector
//!
//! Owns the calibration profile, the classifier, the XP ledger and the
//! injected store. Detectors never reach for globals.

use crate::calibration::{CalibrationProfile, Calibrator, RecordOutcome, SampleKind};
use crate::classifier::{OnlineClassifier, TrainingExample, TrainingJob, TrainingOutcome};
use crate::config::TrackingConfig;
use crate::error::GestureResult;
use crate::experience::{ExperienceLedger, Skill};
use crate::store::{load_or_default, KeyValueStore, LEDGER_KEY, PROFILE_KEY};

pub struct SessionContext {
    pub calibrator: Calibrator,
    pub classifier: OnlineClassifier,
    pub ledger: ExperienceLedger,
    store: Box<dyn KeyValueStore>,
}

impl SessionContext {
    /// Load persisted state (defaults on absence/corruption)
    pub fn load(store: Box<dyn KeyValueStore>, config: &TrackingConfig) -> Self {
        let profile: CalibrationProfile = load_or_default(store.as_ref(), PROFILE_KEY);
        let ledger: ExperienceLedger = load_or_default(store.as_ref(), LEDGER_KEY);
        let classifier = OnlineClassifier::load(store.as_ref(), config);
        log::info!(
            "Session loaded: shoulder baseline {:.3}, punch threshold {:.2}, {} queued examples",
            profile.baseline_shoulder_distance,
            profile.punch_velocity_threshold,
            classifier.queue().len()
        );
        Self {
            calibrator: Calibrator::new(profile, config),
            classifier,
            ledger,
            store,
        }
    }

    pub fn profile(&self) -> &CalibrationProfile {
        self.calibrator.profile()
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Give the store back (rebuilding the session under a new config)
    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }

    /// Record a calibration sample and queue the matching training example
    pub fn record_sample(&mut self, kind: SampleKind, value: f32) -> RecordOutcome {
        let outcome = self.calibrator.record_sample(kind, value, self.store.as_mut());
        let example = TrainingExample::from_sample(self.calibrator.latest(), kind);
        self.classifier.ingest(example, self.store.as_mut());
        outcome
    }

    /// String-keyed variant for hosts; unknown kinds are ignored with a warning
    pub fn record_named(&mut self, kind: &str, value: f32) -> Option<RecordOutcome> {
        match kind.parse::<SampleKind>() {
            Ok(kind) => Some(self.record_sample(kind, value)),
            Err(e) => {
                log::warn!("Ignoring sample: {}", e);
                None
            }
        }
    }

    pub fn seed_baseline(&mut self, distance: f32) {
        self.calibrator.seed_baseline(distance, self.store.as_mut());
    }

    pub fn award_xp(&mut self, skill: Skill, amount: u32) -> u32 {
        self.ledger.award(skill, amount, self.store.as_mut())
    }

    pub fn award_xp_named(&mut self, skill: &str, amount: u32) -> Option<u32> {
        self.ledger.award_xp(skill, amount, self.store.as_mut())
    }

    pub fn start_tutorial(&mut self) {
        self.calibrator.start_tutorial();
    }

    pub fn poll_training(&mut self, now_ms: f64) -> Option<TrainingJob> {
        self.classifier.poll(now_ms)
    }

    pub fn complete_training(&mut self, result: GestureResult<TrainingOutcome>) -> Option<f32> {
        self.classifier.complete(result, &mut self.ledger, self.store.as_mut())
    }
}
