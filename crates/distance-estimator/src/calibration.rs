//! Camera calibration parameters

use crate::DistanceError;
use serde::{Deserialize, Serialize};

/// Camera intrinsic and extrinsic parameters.
///
/// `depth_scale` encodes the inverse law `distance = depth_scale / depth`
/// for normalized depth in (0, 1]; higher normalized depth means closer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraCalibration {
    /// Focal length X (pixels)
    pub fx: f32,
    /// Focal length Y (pixels)
    pub fy: f32,
    /// Principal point X
    pub cx: f32,
    /// Principal point Y
    pub cy: f32,

    /// Camera height from ground (meters)
    pub height_m: f32,
    /// Camera pitch angle (radians, positive = looking down)
    pub pitch_rad: f32,

    /// Scale factor for metric depth
    pub depth_scale: f32,
    /// Distance clamp for near-zero depth (meters)
    pub max_distance_m: f32,
}

impl Default for CameraCalibration {
    fn default() -> Self {
        Self {
            fx: 500.0,
            fy: 500.0,
            cx: 320.0,
            cy: 240.0,
            height_m: 1.5,
            pitch_rad: 0.0,
            depth_scale: 10.0,
            max_distance_m: 100.0,
        }
    }
}

impl CameraCalibration {
    /// Validate calibration invariants. Zero or negative scale is a
    /// configuration error, not a runtime condition.
    pub fn validate(&self) -> Result<(), DistanceError> {
        if self.depth_scale <= 0.0 || !self.depth_scale.is_finite() {
            return Err(DistanceError::InvalidDepthScale(self.depth_scale));
        }
        if self.max_distance_m <= 0.0 || !self.max_distance_m.is_finite() {
            return Err(DistanceError::InvalidMaxDistance(self.max_distance_m));
        }
        Ok(())
    }

    /// 3x3 camera intrinsic matrix (row-major)
    pub fn intrinsic_matrix(&self) -> [[f32; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CameraCalibration::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_nonpositive_scale() {
        let cal = CameraCalibration {
            depth_scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            cal.validate(),
            Err(DistanceError::InvalidDepthScale(_))
        ));

        let cal = CameraCalibration {
            depth_scale: -2.0,
            ..Default::default()
        };
        assert!(cal.validate().is_err());
    }

    #[test]
    fn test_intrinsic_matrix_layout() {
        let cal = CameraCalibration::default();
        let k = cal.intrinsic_matrix();
        assert_eq!(k[0][0], 500.0);
        assert_eq!(k[0][2], 320.0);
        assert_eq!(k[1][2], 240.0);
        assert_eq!(k[2][2], 1.0);
    }
}
