//! Guided calibration tutorial
//!
//! Steps run in order (walk -> turn -> punch). Only the pending step's action
//! counts; counters only go up until the step completes.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorialAction {
    Walk,
    Turn,
    Punch,
}

impl TutorialAction {
    pub const ORDER: [TutorialAction; 3] = [TutorialAction::Walk, TutorialAction::Turn, TutorialAction::Punch];

    pub fn as_str(&self) -> &'static str {
        match self {
            TutorialAction::Walk => "walk",
            TutorialAction::Turn => "turn",
            TutorialAction::Punch => "punch",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TutorialStep {
    pub action: TutorialAction,
    pub target_count: u32,
    pub current_count: u32,
    pub complete: bool,
}

/// How a gesture currently relates to the tutorial
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step finished; gesture is live
    Live,
    /// Currently being learned
    Learning,
    /// Not reached yet
    Pending,
}

/// Result of feeding one sample into the tutorial
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TutorialProgress {
    /// Action is not the pending step
    Ignored,
    Counted { action: TutorialAction, count: u32 },
    StepCompleted(TutorialAction),
    /// Last step completed
    Finished,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TutorialState {
    steps: Vec<TutorialStep>,
    current: usize,
}

impl TutorialState {
    pub fn new(target_count: u32) -> Self {
        let steps = TutorialAction::ORDER
            .iter()
            .map(|&action| TutorialStep {
                action,
                target_count: target_count.max(1),
                current_count: 0,
                complete: false,
            })
            .collect();
        Self { steps, current: 0 }
    }

    pub fn steps(&self) -> &[TutorialStep] {
        &self.steps
    }

    pub fn pending_action(&self) -> Option<TutorialAction> {
        self.steps.get(self.current).map(|s| s.action)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.steps.len()
    }

    /// Count one sample of `action`
    pub fn advance(&mut self, action: TutorialAction) -> TutorialProgress {
        let Some(step) = self.steps.get_mut(self.current) else {
            return TutorialProgress::Ignored;
        };
        if step.action != action {
            return TutorialProgress::Ignored;
        }

        step.current_count += 1;
        if step.current_count < step.target_count {
            return TutorialProgress::Counted { action, count: step.current_count };
        }

        step.complete = true;
        self.current += 1;
        if self.is_finished() {
            TutorialProgress::Finished
        } else {
            TutorialProgress::StepCompleted(action)
        }
    }

    pub fn status(&self) -> Vec<(TutorialAction, StepStatus)> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let status = if step.complete {
                    StepStatus::Live
                } else if i == self.current {
                    StepStatus::Learning
                } else {
                    StepStatus::Pending
                };
                (step.action, status)
            })
            .collect()
    }

    /// Short human-readable progress line
    pub fn describe(&self) -> String {
        match self.steps.get(self.current) {
            Some(step) => {
                let live: Vec<&str> = self
                    .steps
                    .iter()
                    .filter(|s| s.complete)
                    .map(|s| s.action.as_str())
                    .collect();
                let mut line = format!(
                    "Learning {}: {}/{}",
                    step.action.as_str(),
                    step.current_count,
                    step.target_count
                );
                if !live.is_empty() {
                    line.push_str(&format!(" (live: {})", live.join(", ")));
                }
                line
            }
            None => "Calibration complete".to_string(),
        }
    }
}
