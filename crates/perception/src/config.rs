//! Perception pipeline configuration

use collision_warning::CollisionConfig;
use distance_estimator::{BboxMethod, CameraCalibration};
use lane_keeping::LaneConfig;
use serde::{Deserialize, Serialize};

/// Perception pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptionConfig {
    /// Camera calibration for depth-to-distance conversion
    pub calibration: CameraCalibration,

    /// Collision warning configuration
    pub collision: CollisionConfig,

    /// Lane keeping configuration
    pub lane: LaneConfig,

    /// Distance method for detections lacking a pre-computed distance
    pub bbox_method: BboxMethod,

    /// Maximum threats carried in the report (display bound)
    pub max_reported_threats: usize,

    /// Rolling window of frame times for the FPS estimate
    pub fps_window: usize,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            calibration: CameraCalibration::default(),
            collision: CollisionConfig::default(),
            lane: LaneConfig::default(),
            bbox_method: BboxMethod::BottomCenter,
            max_reported_threats: 5,
            fps_window: 30,
        }
    }
}
