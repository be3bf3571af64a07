// src/distance.rs
//
// Monocular distance from bounding-box height. Single-parameter pinhole
// approximation: distance is inversely proportional to apparent pixel
// height, scaled by one calibration constant.

use crate::types::EstimatorConfig;

#[derive(Debug, Clone, Copy)]
pub struct DistanceEstimator {
    /// real_height_m * pixel_height_ref
    calibration: f32,
}

impl DistanceEstimator {
    pub fn new(real_height_m: f32, pixel_height_ref: f32) -> Self {
        Self {
            calibration: real_height_m * pixel_height_ref,
        }
    }

    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new(config.real_height_m, config.pixel_height_ref)
    }

    pub fn calibration(&self) -> f32 {
        self.calibration
    }

    /// Approximate camera distance in meters, or `None` for a degenerate box
    /// (zero, negative, or inverted height).
    pub fn estimate(&self, bbox: &[f32; 4]) -> Option<f32> {
        let pixel_height = bbox[3] - bbox[1];
        if pixel_height <= 0.0 {
            return None;
        }
        Some(self.calibration / pixel_height)
    }
}
