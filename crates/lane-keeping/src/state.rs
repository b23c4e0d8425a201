//! Lane detection state

use crate::fit::LanePoly;
use serde::{Deserialize, Serialize};

/// Lane departure status derived from the thresholded center offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneDepartureStatus {
    Centered,
    DriftingLeft,
    DriftingRight,
    DepartedLeft,
    DepartedRight,
    #[default]
    NoLane,
}

/// Current lane detection state, recomputed every frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneState {
    /// Left lane polynomial x = f(y), bird's-eye pixel space
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_poly: Option<LanePoly>,

    /// Right lane polynomial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_poly: Option<LanePoly>,

    /// Lane center polynomial (mean of left and right)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_poly: Option<LanePoly>,

    /// Estimated road width (meters)
    pub road_width_m: f32,

    /// Signed offset from lane center (meters, positive = vehicle right
    /// of center)
    pub center_offset_m: f32,

    /// Curvature radius (meters); infinite when the lane is straight
    pub curvature_radius_m: f32,

    /// Heading angle relative to the lane (degrees)
    pub heading_angle_deg: f32,

    /// Departure classification
    pub departure_status: LaneDepartureStatus,

    /// 0.5 per detected side
    pub confidence: f32,

    /// Suggested steering angle (degrees, positive = turn right)
    pub suggested_steering_deg: f32,
}

impl Default for LaneState {
    fn default() -> Self {
        Self {
            left_poly: None,
            right_poly: None,
            center_poly: None,
            road_width_m: 3.5,
            center_offset_m: 0.0,
            curvature_radius_m: f32::INFINITY,
            heading_angle_deg: 0.0,
            departure_status: LaneDepartureStatus::NoLane,
            confidence: 0.0,
            suggested_steering_deg: 0.0,
        }
    }
}

impl LaneState {
    /// Whether the vehicle has left or is leaving the lane
    pub fn is_departing(&self) -> bool {
        !matches!(
            self.departure_status,
            LaneDepartureStatus::Centered | LaneDepartureStatus::NoLane
        )
    }
}
