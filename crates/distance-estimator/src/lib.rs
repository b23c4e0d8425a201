//! Distance Estimation from Monocular Depth
//!
//! Converts normalized depth maps (0-1, higher = closer) into metric
//! distances using camera calibration:
//! - Point distance with patch averaging
//! - Object distance from bounding boxes
//! - Ground plane distance profile
//! - Closest-point search and proximity zones

mod calibration;
mod estimator;

pub use calibration::CameraCalibration;
pub use estimator::{BboxMethod, DistanceEstimator, Zone};

use thiserror::Error;

/// Distance estimation errors.
///
/// These are construction/configuration failures; per-frame data problems
/// degrade to sentinel distances instead of raising.
#[derive(Debug, Clone, Error)]
pub enum DistanceError {
    /// depth_scale must be positive for the inverse law to be meaningful
    #[error("Invalid depth scale: {0} (must be > 0)")]
    InvalidDepthScale(f32),

    /// Maximum distance clamp must be positive
    #[error("Invalid max distance: {0} (must be > 0)")]
    InvalidMaxDistance(f32),

    /// Calibration sample too close to zero depth to resolve a scale
    #[error("Calibration depth value {0} is below the resolvable minimum 0.01")]
    UnresolvableCalibrationDepth(f32),
}
