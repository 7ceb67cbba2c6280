//! Fixed-window smoothing of telemetry magnitudes.

use std::collections::VecDeque;

/// Moving average over the last [`RunningAverage::CAPACITY`] magnitudes.
///
/// Only the absolute value of each sample is kept: pitch and wind angle
/// arrive signed, classification works on magnitude.
#[derive(Debug, Clone, Default)]
pub struct RunningAverage {
    window: VecDeque<f64>,
}

impl RunningAverage {
    /// Number of samples in the window.
    pub const CAPACITY: usize = 10;

    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(Self::CAPACITY),
        }
    }

    /// Push a sample and return the mean of the current window.
    pub fn update(&mut self, value: f64) -> f64 {
        if self.window.len() >= Self::CAPACITY {
            self.window.pop_front();
        }
        self.window.push_back(value.abs());
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sample() {
        let mut avg = RunningAverage::new();
        assert_eq!(avg.update(4.0), 4.0);
        assert_eq!(avg.len(), 1);
    }

    #[test]
    fn test_sign_is_stripped() {
        let mut avg = RunningAverage::new();
        avg.update(-2.0);
        assert_eq!(avg.update(4.0), 3.0);
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut avg = RunningAverage::new();
        for i in 0..25 {
            avg.update(i as f64);
            assert!(avg.len() <= RunningAverage::CAPACITY);
        }
        assert_eq!(avg.len(), RunningAverage::CAPACITY);
    }

    #[test]
    fn test_oldest_sample_is_evicted() {
        let mut avg = RunningAverage::new();
        for _ in 0..10 {
            avg.update(100.0);
        }
        // Ten zeros push every 100.0 out of the window
        let mut last = 0.0;
        for _ in 0..10 {
            last = avg.update(0.0);
        }
        assert_eq!(last, 0.0);

        // Sample 11 replaces exactly one zero
        assert_eq!(avg.update(-10.0), 1.0);
    }

    #[test]
    fn test_clear() {
        let mut avg = RunningAverage::new();
        avg.update(1.0);
        avg.clear();
        assert!(avg.is_empty());
        assert_eq!(avg.update(6.0), 6.0);
    }
}
