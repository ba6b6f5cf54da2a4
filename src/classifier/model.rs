//! Softmax regression over standardized sample features
//!
//! Small enough to retrain from scratch-ish every few seconds. Each fit warm
//! starts from the current weights, so the model improves incrementally as the
//! queue rolls forward.

use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

use super::features::{GestureLabel, TrainingExample, CLASS_COUNT, FEATURE_COUNT};
use crate::error::{GestureError, GestureResult};

/// Class x feature weight matrix
type Weights = SMatrix<f32, CLASS_COUNT, FEATURE_COUNT>;
/// Per-class vector (bias, logits, probabilities)
type ClassVector = SVector<f32, CLASS_COUNT>;
/// Per-feature vector
type FeatureVector = SVector<f32, FEATURE_COUNT>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierModel {
    weights: Weights,
    bias: ClassVector,
    /// Standardization: (x - mean) / scale
    mean: FeatureVector,
    scale: FeatureVector,
    /// Completed fits
    passes: u32,
}

impl Default for ClassifierModel {
    fn default() -> Self {
        Self {
            weights: Weights::zeros(),
            bias: ClassVector::zeros(),
            mean: FeatureVector::zeros(),
            scale: FeatureVector::repeat(1.0),
            passes: 0,
        }
    }
}

impl ClassifierModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }

    pub fn is_trained(&self) -> bool {
        self.passes > 0
    }

    /// Most likely label and its probability
    pub fn predict(&self, features: &[f32; FEATURE_COUNT]) -> (GestureLabel, f32) {
        let probs = self.probabilities(&self.standardize(features));
        let idx = probs.imax();
        (GestureLabel::from_index(idx), probs[idx])
    }

    /// Fit on a batch with full-batch gradient descent. Returns accuracy on the batch.
    pub fn fit(&mut self, examples: &[TrainingExample], epochs: usize, learning_rate: f32) -> GestureResult<f32> {
        if examples.is_empty() {
            return Err(GestureError::Training("empty batch".into()));
        }
        if let Some(bad) = examples.iter().position(|ex| !ex.is_well_formed()) {
            return Err(GestureError::Training(format!("malformed example at index {}", bad)));
        }

        let mut candidate = self.clone();
        candidate.update_standardization(examples);

        let xs: Vec<FeatureVector> = examples.iter().map(|ex| candidate.standardize(&ex.features)).collect();
        let ys: Vec<ClassVector> = examples.iter().map(|ex| ClassVector::from_column_slice(&ex.label)).collect();
        let n = examples.len() as f32;

        for _ in 0..epochs {
            let mut grad_w = Weights::zeros();
            let mut grad_b = ClassVector::zeros();
            for (x, y) in xs.iter().zip(ys.iter()) {
                let err = candidate.probabilities(x) - y;
                grad_w += err * x.transpose();
                grad_b += err;
            }
            candidate.weights -= grad_w * (learning_rate / n);
            candidate.bias -= grad_b * (learning_rate / n);
        }

        if candidate.weights.iter().chain(candidate.bias.iter()).any(|v| !v.is_finite()) {
            return Err(GestureError::Training("fit diverged".into()));
        }

        let correct = xs
            .iter()
            .zip(examples.iter())
            .filter(|(x, ex)| candidate.probabilities(x).imax() == ex.label_index())
            .count();

        candidate.passes += 1;
        *self = candidate;
        Ok(correct as f32 / n)
    }

    fn update_standardization(&mut self, examples: &[TrainingExample]) {
        let n = examples.len() as f32;
        let mut mean = FeatureVector::zeros();
        for ex in examples {
            mean += FeatureVector::from_column_slice(&ex.features);
        }
        mean /= n;

        let mut var = FeatureVector::zeros();
        for ex in examples {
            let d = FeatureVector::from_column_slice(&ex.features) - mean;
            var += d.component_mul(&d);
        }
        var /= n;

        self.mean = mean;
        // Constant features keep unit scale
        self.scale = var.map(|v| if v.sqrt() < 1e-6 { 1.0 } else { v.sqrt() });
    }

    fn standardize(&self, features: &[f32; FEATURE_COUNT]) -> FeatureVector {
        (FeatureVector::from_column_slice(features) - self.mean).component_div(&self.scale)
    }

    fn probabilities(&self, x: &FeatureVector) -> ClassVector {
        let logits = self.weights * x + self.bias;
        let max = logits.max();
        let exp = logits.map(|v| (v - max).exp());
        let sum = exp.sum();
        exp / sum
    }
}
