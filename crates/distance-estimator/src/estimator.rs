//! Depth-to-distance conversion and distance queries

use crate::{CameraCalibration, DistanceError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vision_frame::{BoundingBox, DepthMap};

/// Normalized depth below this cannot be resolved into a distance
const MIN_RESOLVABLE_DEPTH: f32 = 0.01;

/// Proximity zone for a distance reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Danger,
    Warning,
    Safe,
}

/// Distance estimation method for a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BboxMethod {
    /// Sample at the box center
    Center,
    /// Sample just above the bottom edge; objects rest on the ground
    #[default]
    BottomCenter,
    /// Closest point in the box (maximum normalized depth)
    Min,
    /// Median depth over the box
    Median,
}

/// Estimate real-world distances from monocular depth maps.
///
/// Converts normalized depth values to metric distances using camera
/// calibration parameters.
pub struct DistanceEstimator {
    calibration: CameraCalibration,
}

impl DistanceEstimator {
    /// Danger zone boundary (meters)
    pub const ZONE_DANGER_M: f32 = 5.0;
    /// Warning zone boundary (meters)
    pub const ZONE_WARNING_M: f32 = 15.0;

    /// Create an estimator, validating the calibration
    pub fn new(calibration: CameraCalibration) -> Result<Self, DistanceError> {
        calibration.validate()?;
        debug!(
            depth_scale = calibration.depth_scale,
            max_distance_m = calibration.max_distance_m,
            "Creating distance estimator"
        );
        Ok(Self { calibration })
    }

    /// Estimator with default calibration
    pub fn with_defaults() -> Self {
        Self {
            calibration: CameraCalibration::default(),
        }
    }

    /// Current calibration
    pub fn calibration(&self) -> &CameraCalibration {
        &self.calibration
    }

    /// Convert normalized depth to metric distance.
    ///
    /// Inverse relationship: closer objects have higher depth values.
    /// Depth below the resolvable minimum maps to the max-distance clamp.
    pub fn depth_to_distance(&self, depth: f32) -> f32 {
        let depth = depth.clamp(0.0, 1.0);
        if depth < MIN_RESOLVABLE_DEPTH {
            return self.calibration.max_distance_m;
        }
        (self.calibration.depth_scale / depth).min(self.calibration.max_distance_m)
    }

    /// Estimate distance at a pixel, averaging depth over a
    /// (2*window + 1)^2 patch to suppress per-pixel noise
    pub fn estimate_at_point(&self, map: &DepthMap, x: usize, y: usize, window: usize) -> f32 {
        let w = map.width();
        let h = map.height();

        // Keep the whole patch inside the map when it fits
        let x = if w > 2 * window {
            x.clamp(window, w - window - 1)
        } else {
            x.min(w - 1)
        };
        let y = if h > 2 * window {
            y.clamp(window, h - window - 1)
        } else {
            y.min(h - 1)
        };

        let x0 = x.saturating_sub(window);
        let x1 = (x + window + 1).min(w);
        let y0 = y.saturating_sub(window);
        let y1 = (y + window + 1).min(h);

        let patch = map.view().slice(ndarray::s![y0..y1, x0..x1]).to_owned();
        let avg = patch.mean().unwrap_or(0.0);

        self.depth_to_distance(avg)
    }

    /// Estimate distance to an object defined by a bounding box.
    ///
    /// Degenerate or fully out-of-frame boxes return infinity.
    pub fn estimate_for_bbox(&self, map: &DepthMap, bbox: &BoundingBox, method: BboxMethod) -> f32 {
        let w = map.width();
        let h = map.height();

        let x1 = (bbox.x1.max(0.0) as usize).min(w);
        let x2 = (bbox.x2.max(0.0) as usize).min(w);
        let y1 = (bbox.y1.max(0.0) as usize).min(h);
        let y2 = (bbox.y2.max(0.0) as usize).min(h);

        if x2 <= x1 || y2 <= y1 {
            return f32::INFINITY;
        }

        match method {
            BboxMethod::Center => {
                let cx = (x1 + x2) / 2;
                let cy = (y1 + y2) / 2;
                self.estimate_at_point(map, cx, cy, 5)
            }
            BboxMethod::BottomCenter => {
                let cx = (x1 + x2) / 2;
                let cy = y2.saturating_sub(5);
                self.estimate_at_point(map, cx, cy, 10)
            }
            BboxMethod::Min => {
                let roi = map.view().slice(ndarray::s![y1..y2, x1..x2]).to_owned();
                // Max normalized depth = closest point
                let max_depth = roi.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                self.depth_to_distance(max_depth)
            }
            BboxMethod::Median => {
                let mut values: Vec<f32> = map
                    .view()
                    .slice(ndarray::s![y1..y2, x1..x2])
                    .iter()
                    .copied()
                    .collect();
                values.sort_by(f32::total_cmp);
                let mid = values.len() / 2;
                let median = if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                };
                self.depth_to_distance(median)
            }
        }
    }

    /// Distance profile along one horizontal scanline of the road surface.
    ///
    /// `y_ratio` selects the scanline (0 = top, 1 = bottom).
    pub fn ground_profile(&self, map: &DepthMap, y_ratio: f32) -> Vec<f32> {
        let h = map.height();
        let y = ((h as f32 * y_ratio.clamp(0.0, 1.0)) as usize).min(h - 1);

        map.view()
            .row(y)
            .iter()
            .map(|&d| self.depth_to_distance(d))
            .collect()
    }

    /// Convert an entire depth map to a metric distance map
    pub fn create_distance_map(&self, map: &DepthMap) -> Array2<f32> {
        let max = self.calibration.max_distance_m;
        map.view()
            .mapv(|d| self.depth_to_distance(d).clamp(0.0, max))
    }

    /// Proximity zone for a distance reading
    pub fn zone(&self, distance: f32) -> Zone {
        if distance < Self::ZONE_DANGER_M {
            Zone::Danger
        } else if distance < Self::ZONE_WARNING_M {
            Zone::Warning
        } else {
            Zone::Safe
        }
    }

    /// Find the closest point in the map (maximum normalized depth),
    /// optionally restricted to a region of interest.
    ///
    /// Returns the distance and the pixel coordinate in full-map space.
    pub fn closest_point(
        &self,
        map: &DepthMap,
        roi: Option<&BoundingBox>,
    ) -> (f32, (usize, usize)) {
        let w = map.width();
        let h = map.height();

        let (x1, y1, x2, y2) = match roi {
            Some(b) => (
                (b.x1.max(0.0) as usize).min(w),
                (b.y1.max(0.0) as usize).min(h),
                (b.x2.max(0.0) as usize).min(w),
                (b.y2.max(0.0) as usize).min(h),
            ),
            None => (0, 0, w, h),
        };

        if x2 <= x1 || y2 <= y1 {
            return (self.calibration.max_distance_m, (0, 0));
        }

        let mut max_depth = f32::NEG_INFINITY;
        let mut max_at = (x1, y1);
        let region = map.view();
        for y in y1..y2 {
            for x in x1..x2 {
                let d = region[(y, x)];
                if d > max_depth {
                    max_depth = d;
                    max_at = (x, y);
                }
            }
        }

        (self.depth_to_distance(max_depth), max_at)
    }

    /// Recompute the depth scale from a known distance measurement.
    ///
    /// Only valid for depth values above the resolvable minimum.
    pub fn calibrate_from_known_distance(
        &mut self,
        depth_value: f32,
        actual_distance_m: f32,
    ) -> Result<(), DistanceError> {
        if depth_value <= MIN_RESOLVABLE_DEPTH {
            return Err(DistanceError::UnresolvableCalibrationDepth(depth_value));
        }
        self.calibration.depth_scale = actual_distance_m * depth_value;
        self.calibration.validate()?;
        info!(
            depth_scale = self.calibration.depth_scale,
            "Calibrated depth scale from known distance"
        );
        Ok(())
    }
}
