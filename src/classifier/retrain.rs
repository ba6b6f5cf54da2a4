//! Retraining task: Idle -> Running -> (PendingRerun) -> Idle
//!
//! At most one job in flight. Requests while running collapse into a single
//! pending rerun. Jobs are self-contained so the host can run them off the
//! frame path and hand the result back.

use super::features::TrainingExample;
use super::model::ClassifierModel;
use crate::error::GestureResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetrainState {
    Idle,
    Running,
    /// Running, and another pass was asked for meanwhile
    PendingRerun,
}

/// Snapshot of everything one training pass needs
#[derive(Debug)]
pub struct TrainingJob {
    examples: Vec<TrainingExample>,
    model: ClassifierModel,
    epochs: usize,
    learning_rate: f32,
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: ClassifierModel,
    pub accuracy: f32,
    pub example_count: usize,
}

impl TrainingJob {
    pub(crate) fn new(
        examples: Vec<TrainingExample>,
        model: ClassifierModel,
        epochs: usize,
        learning_rate: f32,
    ) -> Self {
        Self { examples, model, epochs, learning_rate }
    }

    pub fn example_count(&self) -> usize {
        self.examples.len()
    }

    /// Run the fit. Pure; touches no shared state.
    pub fn run(mut self) -> GestureResult<TrainingOutcome> {
        let accuracy = self.model.fit(&self.examples, self.epochs, self.learning_rate)?;
        Ok(TrainingOutcome {
            model: self.model,
            accuracy,
            example_count: self.examples.len(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct RetrainScheduler {
    state: RetrainState,
    /// New examples (or a coalesced rerun) since the last start
    dirty: bool,
    last_started_ms: Option<f64>,
    interval_ms: f64,
    min_examples: usize,
}

impl RetrainScheduler {
    pub fn new(interval_ms: f64, min_examples: usize) -> Self {
        Self {
            state: RetrainState::Idle,
            dirty: false,
            last_started_ms: None,
            interval_ms,
            min_examples,
        }
    }

    pub fn state(&self) -> RetrainState {
        self.state
    }

    /// Take over the busy state and rerun flag of a scheduler being replaced,
    /// keeping this one's interval and minimum
    pub fn inherit(&mut self, previous: &RetrainScheduler) {
        self.state = previous.state;
        self.dirty = previous.dirty;
        self.last_started_ms = previous.last_started_ms;
    }

    /// Ask for a retrain; never queues more than one extra pass
    pub fn request(&mut self) {
        match self.state {
            RetrainState::Idle => self.dirty = true,
            RetrainState::Running => self.state = RetrainState::PendingRerun,
            RetrainState::PendingRerun => {}
        }
    }

    /// Enter Running if all gates pass
    pub fn try_start(&mut self, now_ms: f64, available: usize) -> bool {
        if self.state != RetrainState::Idle || !self.dirty || available < self.min_examples {
            return false;
        }
        if let Some(last) = self.last_started_ms {
            if now_ms - last < self.interval_ms {
                return false;
            }
        }
        self.state = RetrainState::Running;
        self.dirty = false;
        self.last_started_ms = Some(now_ms);
        true
    }

    /// Leave Running. `retry` keeps the schedule armed (used after a failed pass).
    /// Returns true if a coalesced rerun is now due.
    pub fn finish(&mut self, retry: bool) -> bool {
        let rerun = self.state == RetrainState::PendingRerun;
        self.state = RetrainState::Idle;
        if rerun || retry {
            self.dirty = true;
        }
        rerun
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_minimum_examples() {
        let mut s = RetrainScheduler::new(5000.0, 10);
        s.request();
        assert!(!s.try_start(0.0, 9));
        assert!(s.try_start(0.0, 10));
        assert_eq!(s.state(), RetrainState::Running);
    }

    #[test]
    fn test_requests_while_running_coalesce() {
        let mut s = RetrainScheduler::new(5000.0, 1);
        s.request();
        assert!(s.try_start(0.0, 5));
        s.request();
        s.request();
        s.request();
        assert_eq!(s.state(), RetrainState::PendingRerun);
        // Busy: no second job
        assert!(!s.try_start(100.0, 5));
        assert!(s.finish(false));
        assert_eq!(s.state(), RetrainState::Idle);
        // Rerun still respects the interval
        assert!(!s.try_start(4999.0, 5));
        assert!(s.try_start(5000.0, 5));
        assert!(!s.finish(false));
        // Nothing pending afterwards
        assert!(!s.try_start(20000.0, 5));
    }

    #[test]
    fn test_inherited_busy_state_blocks_new_jobs() {
        let mut old = RetrainScheduler::new(5000.0, 1);
        old.request();
        assert!(old.try_start(0.0, 5));

        let mut next = RetrainScheduler::new(8000.0, 1);
        next.request();
        next.inherit(&old);
        assert_eq!(next.state(), RetrainState::Running);
        assert!(!next.try_start(33.0, 5));
        next.request();
        assert!(next.finish(false));
        // New interval applies to the rerun
        assert!(!next.try_start(5000.0, 5));
        assert!(next.try_start(8000.0, 5));
    }

    #[test]
    fn test_failed_pass_retries_next_interval() {
        let mut s = RetrainScheduler::new(5000.0, 1);
        s.request();
        assert!(s.try_start(0.0, 5));
        s.finish(true);
        assert!(!s.try_start(1000.0, 5));
        assert!(s.try_start(5000.0, 5));
    }
}
