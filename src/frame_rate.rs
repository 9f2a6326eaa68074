use std::collections::VecDeque;

/// Number of timestamps the estimator keeps by default.
pub const DEFAULT_WINDOW: usize = 25;

/// Sliding-window frame rate estimate over the most recent capture timestamps.
#[derive(Debug, Clone)]
pub struct FrameRateEstimator {
    window: VecDeque<i64>,
    capacity: usize,
}

impl Default for FrameRateEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl FrameRateEstimator {
    pub fn new(capacity: usize) -> FrameRateEstimator {
        let capacity = capacity.max(2);
        FrameRateEstimator {
            window: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn record(&mut self, timestamp: i64) {
        self.window.push_back(timestamp);
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }
    }

    /// Frames per second given the tick frequency of the recorded timestamps.
    ///
    /// Returns 0 with fewer than two samples or a non-positive time span.
    pub fn current_fps(&self, tick_frequency: f64) -> f64 {
        let (Some(oldest), Some(newest)) = (self.window.front(), self.window.back()) else {
            return 0.0;
        };
        if self.window.len() < 2 {
            return 0.0;
        }
        let span = newest - oldest;
        if span <= 0 {
            return 0.0;
        }
        self.window.len() as f64 * tick_frequency / span as f64
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
