//! Bounded sliding window of raw samples for one reference point

use std::collections::VecDeque;

use crate::constants::calibration::MAX_AVG_SAMPLES;
use crate::data::{CalibrationPoint, RawSample};

/// FIFO of the most recent samples, capped at a fixed capacity
///
/// Pushing past capacity evicts the oldest sample, so the first contact and
/// any early jitter age out while the finger rests on the target.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<RawSample>,
    capacity: usize,
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::with_capacity(MAX_AVG_SAMPLES)
    }
}

impl SampleWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn push(&mut self, sample: RawSample) {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Drain the window into the mean of its samples
    ///
    /// Returns `None` when nothing was pushed. The window is empty afterwards
    /// either way.
    pub fn resolve(&mut self) -> Option<CalibrationPoint> {
        let count = self.samples.len();
        if count == 0 {
            return None;
        }
        let (sum_x, sum_y) = self
            .samples
            .drain(..)
            .fold((0i64, 0i64), |(sx, sy), s| (sx + s.x as i64, sy + s.y as i64));
        Some(CalibrationPoint::new(
            sum_x as f64 / count as f64,
            sum_y as f64 / count as f64,
        ))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn samples(&self) -> impl Iterator<Item = &RawSample> {
        self.samples.iter()
    }
}
