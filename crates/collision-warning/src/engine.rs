//! Threat evaluation and warning aggregation

use crate::config::CollisionConfig;
use crate::threat::{CollisionThreat, WarningLevel, WarningState, WarningType};
use crate::track::{TrackHistory, TrackSample};
use tracing::{debug, warn};
use vision_frame::{Detection, ObjectClass};

/// TTC thresholds (seconds)
const TTC_CRITICAL_S: f32 = 1.0;
const TTC_DANGER_S: f32 = 2.0;
const TTC_WARNING_S: f32 = 3.5;
const TTC_INFO_S: f32 = 5.0;

/// Distance thresholds (meters)
const DIST_CRITICAL_M: f32 = 3.0;
const DIST_DANGER_M: f32 = 8.0;
const DIST_WARNING_M: f32 = 15.0;
const DIST_SAFE_M: f32 = 30.0;

/// Objects farther than this from the centerline are off our path
const LATERAL_THRESHOLD_M: f32 = 2.0;
/// Lateral offset classifying a threat as a side collision
const SIDE_COLLISION_LATERAL_M: f32 = 1.5;

/// Pixel-to-meter proxy: image half-width maps to roughly this many meters
const LATERAL_FOV_HALF_WIDTH_M: f32 = 3.0;

/// Collision Warning System.
///
/// Owns per-object track history and recomputes the warning state from
/// fresh detections every frame. One instance per camera stream.
pub struct CollisionWarning {
    config: CollisionConfig,
    history: TrackHistory,
}

impl CollisionWarning {
    /// Create a warning engine from configuration
    pub fn new(config: CollisionConfig) -> Self {
        debug!(
            ego_velocity_mps = config.ego_velocity_mps,
            min_confidence = config.min_confidence,
            "Creating collision warning engine"
        );
        let history = TrackHistory::new(config.history_window_s);
        Self { config, history }
    }

    /// Current configuration
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Update ego vehicle velocity (clamped at 0)
    pub fn update_ego_velocity(&mut self, velocity_mps: f32) {
        self.config.ego_velocity_mps = velocity_mps.max(0.0);
    }

    /// Forget all track history (e.g. on stream restart)
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Analyze detections and produce the frame's warning state.
    ///
    /// Detections below the confidence floor, beyond the safe distance,
    /// or with no usable distance are dropped silently; a frame with no
    /// threats is a normal state, not an error.
    pub fn analyze(
        &mut self,
        detections: &[Detection],
        frame_width: u32,
        timestamp: f64,
    ) -> WarningState {
        self.history.sweep(timestamp);

        let mut threats: Vec<CollisionThreat> = Vec::new();
        for detection in detections {
            if detection.confidence < self.config.min_confidence {
                debug!(
                    confidence = detection.confidence,
                    "Detection below confidence floor, skipping"
                );
                continue;
            }
            if let Some(threat) = self.evaluate_threat(detection, frame_width, timestamp) {
                if threat.level != WarningLevel::None {
                    threats.push(threat);
                }
            }
        }

        // Lowest TTC first; ties broken by distance
        threats.sort_by(|a, b| {
            a.ttc_s
                .total_cmp(&b.ttc_s)
                .then(a.distance_m.total_cmp(&b.distance_m))
        });

        let mut state = WarningState {
            timestamp,
            ..Default::default()
        };

        if let Some(primary) = threats.first() {
            state.highest_level = threats.iter().map(|t| t.level).max().unwrap_or_default();
            state.warning_message = warning_message(primary);
            state.audio_alert =
                self.config.enable_audio && state.highest_level >= WarningLevel::Warning;
            state.brake_assist_triggered = state.highest_level == WarningLevel::Critical;
            state.primary_threat = Some(primary.clone());

            if state.brake_assist_triggered {
                warn!(
                    distance_m = primary.distance_m,
                    ttc_s = primary.ttc_s,
                    "Brake assist triggered"
                );
            }
        }
        state.active_threats = threats;

        state
    }

    /// Evaluate one detection into a threat record
    fn evaluate_threat(
        &mut self,
        detection: &Detection,
        frame_width: u32,
        timestamp: f64,
    ) -> Option<CollisionThreat> {
        let distance = detection.distance_m.unwrap_or(f32::INFINITY);
        if distance <= 0.0 || distance > DIST_SAFE_M {
            return None;
        }

        let lateral = lateral_offset(detection.bbox.center_x(), frame_width);

        // Untracked detections are evaluated statelessly: no history entry,
        // zero estimated relative velocity
        let relative_velocity = match detection.track_id {
            Some(id) => {
                self.history.push(
                    id,
                    TrackSample {
                        timestamp,
                        distance_m: distance,
                        lateral_m: lateral,
                    },
                );
                self.history.velocity(id)
            }
            None => 0.0,
        };

        let closing_velocity = self.config.ego_velocity_mps - relative_velocity;
        let ttc = time_to_collision(distance, closing_velocity);

        Some(CollisionThreat {
            track_id: detection.track_id,
            class: detection.class,
            distance_m: distance,
            relative_velocity_mps: relative_velocity,
            ttc_s: ttc,
            lateral_offset_m: lateral,
            level: classify_level(distance, ttc, lateral),
            kind: classify_type(detection.class, lateral),
            confidence: detection.confidence,
        })
    }
}

/// Approximate lateral offset in meters from the bbox horizontal center.
///
/// Linear pixel-to-meter proxy, not a projective inverse.
fn lateral_offset(center_x: f32, frame_width: u32) -> f32 {
    if frame_width == 0 {
        return 0.0;
    }
    let half_width = frame_width as f32 / 2.0;
    (center_x - half_width) / half_width * LATERAL_FOV_HALF_WIDTH_M
}

/// Time to collision at the current closing velocity; infinite when not
/// on a collision course.
fn time_to_collision(distance_m: f32, closing_velocity_mps: f32) -> f32 {
    if closing_velocity_mps <= 0.0 {
        return f32::INFINITY;
    }
    (distance_m / closing_velocity_mps).max(0.0)
}

/// Severity from TTC with a pure-distance fallback when TTC is infinite.
///
/// Off-path objects (beyond the lateral threshold) never rise above INFO.
fn classify_level(distance_m: f32, ttc_s: f32, lateral_m: f32) -> WarningLevel {
    if lateral_m.abs() > LATERAL_THRESHOLD_M {
        return if distance_m < DIST_WARNING_M {
            WarningLevel::Info
        } else {
            WarningLevel::None
        };
    }

    if ttc_s < TTC_CRITICAL_S {
        return WarningLevel::Critical;
    } else if ttc_s < TTC_DANGER_S {
        return WarningLevel::Danger;
    } else if ttc_s < TTC_WARNING_S {
        return WarningLevel::Warning;
    } else if ttc_s < TTC_INFO_S {
        return WarningLevel::Info;
    }

    if distance_m < DIST_CRITICAL_M {
        WarningLevel::Danger
    } else if distance_m < DIST_DANGER_M {
        WarningLevel::Warning
    } else if distance_m < DIST_WARNING_M {
        WarningLevel::Info
    } else {
        WarningLevel::None
    }
}

/// Vulnerable road users always get their dedicated warning type; vehicles
/// split on lateral offset.
fn classify_type(class: ObjectClass, lateral_m: f32) -> WarningType {
    match class {
        ObjectClass::Person => WarningType::Pedestrian,
        c if c.is_vulnerable() => WarningType::Cyclist,
        _ if lateral_m.abs() > SIDE_COLLISION_LATERAL_M => WarningType::SideCollision,
        _ => WarningType::ForwardCollision,
    }
}

fn warning_message(threat: &CollisionThreat) -> String {
    let base = match threat.level {
        WarningLevel::Critical => "BRAKE NOW!",
        WarningLevel::Danger => "Collision risk!",
        WarningLevel::Warning => "Caution ahead",
        WarningLevel::Info => "Object detected",
        WarningLevel::None => return String::new(),
    };

    let target = match threat.kind {
        WarningType::Pedestrian => "Pedestrian".to_string(),
        WarningType::Cyclist => "Cyclist".to_string(),
        _ => {
            let label = threat.class.label();
            let mut chars = label.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => label.to_string(),
            }
        }
    };

    format!(
        "{} {} at {:.1}m (TTC: {:.1}s)",
        base, target, threat.distance_m, threat.ttc_s
    )
}
