//! Feature extraction for the auxiliary gesture classifier
//!
//! One example per recorded calibration sample:
//! - 0: last shoulder distance
//! - 1: last punch velocity
//! - 2: last punch elbow angle
//! - 3: last walking cadence
//! - 4: sample kind index

use serde::{Deserialize, Serialize};

use crate::calibration::SampleKind;

/// Number of features per example
pub const FEATURE_COUNT: usize = 5;

/// Number of output classes
pub const CLASS_COUNT: usize = 3;

/// Class labels (order matches one-hot encoding)
pub const GESTURE_LABELS: [&str; CLASS_COUNT] = ["walk", "punch", "other"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    Walk,
    Punch,
    Other,
}

impl GestureLabel {
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => GestureLabel::Walk,
            1 => GestureLabel::Punch,
            _ => GestureLabel::Other,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            GestureLabel::Walk => 0,
            GestureLabel::Punch => 1,
            GestureLabel::Other => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        GESTURE_LABELS[self.index()]
    }

    pub fn for_sample(kind: SampleKind) -> Self {
        match kind {
            SampleKind::Walk => GestureLabel::Walk,
            SampleKind::PunchVelocity | SampleKind::PunchElbowAngle => GestureLabel::Punch,
            SampleKind::ShoulderDistance | SampleKind::Turn => GestureLabel::Other,
        }
    }

    pub fn one_hot(&self) -> [f32; CLASS_COUNT] {
        let mut out = [0.0; CLASS_COUNT];
        out[self.index()] = 1.0;
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: [f32; FEATURE_COUNT],
    pub label: [f32; CLASS_COUNT],
}

impl TrainingExample {
    /// Build an example from the latest per-metric values and the sample kind
    pub fn from_sample(latest: [f32; 4], kind: SampleKind) -> Self {
        Self {
            features: extract_features(latest, kind),
            label: GestureLabel::for_sample(kind).one_hot(),
        }
    }

    pub fn label_index(&self) -> usize {
        self.label
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0
    }

    pub fn is_well_formed(&self) -> bool {
        let finite = self.features.iter().chain(self.label.iter()).all(|v| v.is_finite());
        let hot = self.label.iter().filter(|&&v| v == 1.0).count();
        let cold = self.label.iter().filter(|&&v| v == 0.0).count();
        finite && hot == 1 && cold == CLASS_COUNT - 1
    }
}

pub fn extract_features(latest: [f32; 4], kind: SampleKind) -> [f32; FEATURE_COUNT] {
    [
        latest[0],          // 0: shoulder distance
        latest[1],          // 1: punch velocity
        latest[2],          // 2: elbow angle
        latest[3],          // 3: walking cadence
        kind.index() as f32, // 4: sample kind
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_follow_sample_kind() {
        assert_eq!(GestureLabel::for_sample(SampleKind::Walk), GestureLabel::Walk);
        assert_eq!(GestureLabel::for_sample(SampleKind::PunchVelocity), GestureLabel::Punch);
        assert_eq!(GestureLabel::for_sample(SampleKind::Turn), GestureLabel::Other);
    }

    #[test]
    fn test_example_is_one_hot() {
        let ex = TrainingExample::from_sample([0.2, 1.5, 20.0, 0.6], SampleKind::PunchElbowAngle);
        assert_eq!(ex.label, [0.0, 1.0, 0.0]);
        assert_eq!(ex.label_index(), 1);
        assert_eq!(ex.features[4], SampleKind::PunchElbowAngle.index() as f32);
        assert!(ex.is_well_formed());
    }

    #[test]
    fn test_nan_example_is_malformed() {
        let mut ex = TrainingExample::from_sample([0.2, 1.5, 20.0, 0.6], SampleKind::Walk);
        ex.features[0] = f32::NAN;
        assert!(!ex.is_well_formed());
    }
}
