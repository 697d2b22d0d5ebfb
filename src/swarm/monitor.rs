//! Bounded coherence time series (spec §3 `Monitor`).
//!
//! A `#[pyclass]` the same way the teacher exposes plain scalar/vector
//! state to Python (`TrajectoryPoint`, `RateLimitResult`): nothing here
//! needs help from the PyO3 conversion layer.

use parking_lot::RwLock;
use pyo3::prelude::*;
use std::collections::VecDeque;

const DEFAULT_CAPACITY: usize = 1024;
const MIN_CAPACITY: usize = 256;

#[pyclass]
pub struct Monitor {
    capacity: usize,
    samples: RwLock<VecDeque<f64>>,
}

#[pymethods]
impl Monitor {
    #[new]
    #[pyo3(signature = (capacity = DEFAULT_CAPACITY))]
    pub fn new(capacity: usize) -> Self {
        Monitor {
            capacity: capacity.max(MIN_CAPACITY),
            samples: RwLock::new(VecDeque::with_capacity(capacity.max(MIN_CAPACITY))),
        }
    }

    pub fn record_sample(&self, value: f64) {
        let mut samples = self.samples.write();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(value);
    }

    pub fn latest(&self) -> f64 {
        self.samples.read().back().copied().unwrap_or(0.0)
    }

    pub fn average(&self) -> f64 {
        let samples = self.samples.read();
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    pub fn snapshot(&self) -> Vec<f64> {
        self.samples.read().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Monitor::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_monitor_reads_zero() {
        let monitor = Monitor::default();
        assert_eq!(monitor.latest(), 0.0);
        assert_eq!(monitor.average(), 0.0);
        assert!(monitor.snapshot().is_empty());
    }

    #[test]
    fn records_and_reads_back() {
        let monitor = Monitor::default();
        monitor.record_sample(0.5);
        monitor.record_sample(0.7);
        assert_eq!(monitor.latest(), 0.7);
        assert!((monitor.average() - 0.6).abs() < 1e-9);
        assert_eq!(monitor.snapshot(), vec![0.5, 0.7]);
    }

    #[test]
    fn capacity_has_a_floor() {
        let monitor = Monitor::new(10);
        assert_eq!(monitor.capacity, MIN_CAPACITY);
    }

    #[test]
    fn drops_oldest_sample_once_full() {
        let monitor = Monitor::new(MIN_CAPACITY);
        for i in 0..(MIN_CAPACITY + 10) {
            monitor.record_sample(i as f64);
        }
        assert_eq!(monitor.len(), MIN_CAPACITY);
        assert_eq!(monitor.snapshot()[0], 10.0);
    }
}
