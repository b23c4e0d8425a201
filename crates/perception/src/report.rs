//! Unified per-frame output record

use collision_warning::{WarningLevel, WarningState};
use distance_estimator::Zone;
use lane_keeping::{LaneDepartureStatus, LaneState, CURVATURE_CAP_M};
use serde::{Deserialize, Serialize};
use vision_frame::ObjectClass;

/// Compact threat entry for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatSummary {
    pub class: ObjectClass,
    pub distance_m: f32,
    pub ttc_s: f32,
    pub level: WarningLevel,
}

/// Unified ADAS state for one frame, the hand-off record to the
/// transport layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameReport {
    pub timestamp: f64,
    pub frame_id: u64,

    // Collision warning
    pub warning_level: WarningLevel,
    pub warning_message: String,
    pub threats: Vec<ThreatSummary>,
    pub audio_alert: bool,
    pub brake_assist: bool,

    // Lane keeping
    pub lane_status: LaneDepartureStatus,
    pub center_offset_m: f32,
    /// Clamped to [`CURVATURE_CAP_M`] so straight road stays JSON-representable
    pub curvature_radius_m: f32,
    pub heading_angle_deg: f32,
    pub suggested_steering_deg: f32,
    pub lane_confidence: f32,

    // Distance
    pub min_distance_m: f32,
    pub distance_zone: Zone,

    // Processing info
    pub fps: f32,
    pub processing_time_ms: f32,
}

impl FrameReport {
    /// Build the report from the per-frame engine outputs
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        timestamp: f64,
        frame_id: u64,
        warnings: &WarningState,
        lane: &LaneState,
        min_distance_m: f32,
        distance_zone: Zone,
        fps: f32,
        processing_time_ms: f32,
        max_threats: usize,
    ) -> Self {
        let threats = warnings
            .active_threats
            .iter()
            .take(max_threats)
            .map(|t| ThreatSummary {
                class: t.class,
                distance_m: t.distance_m,
                ttc_s: t.ttc_s,
                level: t.level,
            })
            .collect();

        Self {
            timestamp,
            frame_id,
            warning_level: warnings.highest_level,
            warning_message: warnings.warning_message.clone(),
            threats,
            audio_alert: warnings.audio_alert,
            brake_assist: warnings.brake_assist_triggered,
            lane_status: lane.departure_status,
            center_offset_m: lane.center_offset_m,
            curvature_radius_m: lane.curvature_radius_m.min(CURVATURE_CAP_M as f32),
            heading_angle_deg: lane.heading_angle_deg,
            suggested_steering_deg: lane.suggested_steering_deg,
            lane_confidence: lane.confidence,
            min_distance_m,
            distance_zone,
            fps,
            processing_time_ms,
        }
    }

    /// JSON encoding for the transport layer
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
