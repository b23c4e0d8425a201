//! Lane keeping configuration

use serde::{Deserialize, Serialize};

/// Lane keeping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Top of the road ROI as a ratio of image height
    pub roi_top_ratio: f32,

    /// Number of frames of polynomial history for smoothing
    pub history_depth: usize,

    /// Enable temporal smoothing of lane polynomials
    pub enable_smoothing: bool,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            roi_top_ratio: 0.55,
            history_depth: 7,
            enable_smoothing: true,
        }
    }
}
