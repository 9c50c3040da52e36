//! Training Buffer - rolling window of recent feature vectors
//!
//! Bounded FIFO: once full, the oldest vector is evicted for each new one.

use std::collections::VecDeque;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::logic::features::FeatureVector;

pub struct TrainingBuffer {
    capacity: usize,
    vectors: RwLock<VecDeque<FeatureVector>>,
}

impl TrainingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            vectors: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    /// Push a vector; returns how many old vectors were evicted
    pub fn push(&self, vector: FeatureVector) -> usize {
        let mut buffer = self.vectors.write();
        buffer.push_back(vector);

        let mut evicted = 0;
        while buffer.len() > self.capacity {
            buffer.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Copy of the current contents, oldest first
    pub fn snapshot(&self) -> Vec<FeatureVector> {
        self.vectors.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.vectors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.vectors.write().clear();
    }

    pub fn status(&self) -> BufferStatus {
        let current_size = self.len();
        BufferStatus {
            current_size,
            capacity: self.capacity,
            fill_percent: (current_size as f32 / self.capacity as f32 * 100.0).min(100.0),
        }
    }
}

/// Buffer status information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferStatus {
    pub current_size: usize,
    pub capacity: usize,
    pub fill_percent: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_COUNT;

    fn vector(marker: f64) -> FeatureVector {
        FeatureVector::from_values([marker; FEATURE_COUNT])
    }

    #[test]
    fn test_buffer_operations() {
        let buffer = TrainingBuffer::new(10);
        assert!(buffer.is_empty());

        for i in 0..4 {
            assert_eq!(buffer.push(vector(i as f64)), 0);
        }
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.status().fill_percent, 40.0);

        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_oldest_evicted_first() {
        let buffer = TrainingBuffer::new(3);
        for i in 0..5 {
            buffer.push(vector(i as f64));
        }

        let markers: Vec<f64> = buffer.snapshot().iter().map(|v| v.values[0]).collect();
        assert_eq!(markers, vec![2.0, 3.0, 4.0]);
        assert_eq!(buffer.status().fill_percent, 100.0);
    }
}
