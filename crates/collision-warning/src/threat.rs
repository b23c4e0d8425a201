//! Threat records and aggregated warning state

use serde::{Deserialize, Serialize};
use vision_frame::ObjectClass;

/// Warning severity levels, ordered from none to critical
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningLevel {
    #[default]
    None,
    Info,
    Warning,
    Danger,
    Critical,
}

/// Types of collision warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    ForwardCollision,
    Pedestrian,
    Cyclist,
    SideCollision,
    RearCollision,
    LaneDeparture,
}

/// A potential collision threat, built fresh every frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionThreat {
    /// Stable tracker id, if the detection carried one
    pub track_id: Option<u64>,
    /// Object class
    pub class: ObjectClass,
    /// Distance to object (meters)
    pub distance_m: f32,
    /// Estimated relative velocity (m/s, negative = approaching)
    pub relative_velocity_mps: f32,
    /// Time to collision (seconds, infinite when not closing)
    pub ttc_s: f32,
    /// Lateral offset from vehicle centerline (meters)
    pub lateral_offset_m: f32,
    /// Warning severity
    pub level: WarningLevel,
    /// Warning type
    pub kind: WarningType,
    /// Detection confidence
    pub confidence: f32,
}

impl CollisionThreat {
    /// Threats demanding immediate driver action
    pub fn is_critical(&self) -> bool {
        matches!(self.level, WarningLevel::Danger | WarningLevel::Critical)
    }
}

/// Aggregated warning state for one frame, primary threat first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarningState {
    /// Frame timestamp (seconds)
    pub timestamp: f64,
    /// Active threats sorted ascending by (TTC, distance)
    pub active_threats: Vec<CollisionThreat>,
    /// Highest severity across all threats
    pub highest_level: WarningLevel,
    /// The most urgent threat, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_threat: Option<CollisionThreat>,
    /// Human-readable warning for the primary threat
    pub warning_message: String,
    /// Audio alert requested
    pub audio_alert: bool,
    /// Brake assist requested (CRITICAL only)
    pub brake_assist_triggered: bool,
}
