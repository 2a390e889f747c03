//! Bounded history of reported output values.

use std::collections::VecDeque;

/// Past output values of one sensor, oldest first.
///
/// Survives window resets so flow can be computed across reports.
#[derive(Debug, Clone)]
pub struct OutputHistory {
    values: VecDeque<f64>,
    capacity: usize,
}

impl OutputHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record an output, dropping the oldest ones beyond capacity.
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// First differences between consecutive outputs, oldest first.
    pub fn deltas(&self) -> Vec<f64> {
        self.values
            .iter()
            .zip(self.values.iter().skip(1))
            .map(|(a, b)| b - a)
            .collect()
    }
}
