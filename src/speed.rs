// src/speed.rs
//
// Radial speed from a sliding window of (frame index, distance) samples.
// The window lives inside each track's state; the estimator itself only
// holds the frame-rate policy.

use std::collections::VecDeque;

/// Bounded FIFO of the most recent (frame index, distance) samples.
#[derive(Debug, Clone)]
pub struct DistanceHistory {
    samples: VecDeque<(u64, f32)>,
    capacity: usize,
}

impl DistanceHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when the window is full.
    pub fn push(&mut self, frame_index: u64, distance: f32) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back((frame_index, distance));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u64, f32)> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpeedEstimator {
    fps: f64,
}

impl SpeedEstimator {
    pub fn new(fps: f64) -> Self {
        Self { fps }
    }

    /// Mean of the instantaneous speeds over consecutive sample pairs in the
    /// window. `None` with fewer than two samples, or when no pair spans a
    /// positive time delta. Signed: negative means the distance is shrinking
    /// (the object is approaching the camera).
    pub fn average_speed(&self, history: &DistanceHistory) -> Option<f32> {
        if history.len() < 2 {
            return None;
        }

        let mut sum = 0.0f64;
        let mut count = 0usize;
        let mut pairs = history.iter();
        let mut prev = pairs.next()?;

        for sample in pairs {
            let (f0, d0) = *prev;
            let (f1, d1) = *sample;
            let dt = (f1 as f64 - f0 as f64) / self.fps;
            if dt > 0.0 {
                sum += (d1 - d0) as f64 / dt;
                count += 1;
            }
            prev = sample;
        }

        if count == 0 {
            return None;
        }
        Some((sum / count as f64) as f32)
    }
}
