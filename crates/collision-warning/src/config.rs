//! Collision warning configuration

use serde::{Deserialize, Serialize};

/// Collision warning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionConfig {
    /// Ego vehicle velocity (m/s), updatable at runtime
    pub ego_velocity_mps: f32,

    /// Minimum detection confidence to consider
    pub min_confidence: f32,

    /// Enable audio alerts at WARNING severity and above
    pub enable_audio: bool,

    /// Track history sliding window (seconds)
    pub history_window_s: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            ego_velocity_mps: 10.0,
            min_confidence: 0.5,
            enable_audio: true,
            history_window_s: 1.0,
        }
    }
}
