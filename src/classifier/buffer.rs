//! Bounded training-example queue
//!
//! Drop-oldest at capacity. Persisted as a single blob.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::features::TrainingExample;

/// Default maximum number of queued examples
pub const QUEUE_CAPACITY: usize = 1000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingQueue {
    examples: VecDeque<TrainingExample>,
    capacity: usize,
}

impl TrainingQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            examples: VecDeque::with_capacity(capacity.min(QUEUE_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, example: TrainingExample) {
        if self.examples.len() >= self.capacity {
            self.examples.pop_front();
        }
        self.examples.push_back(example);
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change capacity, dropping the oldest examples if needed
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.examples.len() > self.capacity {
            self.examples.pop_front();
        }
    }

    /// Copy of the queue in chronological order, for a training job
    pub fn snapshot(&self) -> Vec<TrainingExample> {
        self.examples.iter().copied().collect()
    }
}

impl Default for TrainingQueue {
    fn default() -> Self {
        Self::new(QUEUE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::SampleKind;

    fn example(v: f32) -> TrainingExample {
        TrainingExample::from_sample([v, 0.0, 0.0, 0.0], SampleKind::Walk)
    }

    #[test]
    fn test_drop_oldest_at_capacity() {
        let mut queue = TrainingQueue::default();
        for i in 0..1200 {
            queue.push(example(i as f32));
        }
        assert_eq!(queue.len(), QUEUE_CAPACITY);
        assert_eq!(queue.snapshot()[0].features[0], 200.0);
    }

    #[test]
    fn test_shrinking_capacity_trims() {
        let mut queue = TrainingQueue::new(10);
        for i in 0..10 {
            queue.push(example(i as f32));
        }
        queue.set_capacity(4);
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.snapshot()[0].features[0], 6.0);
    }
}
