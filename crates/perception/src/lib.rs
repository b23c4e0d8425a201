//! ADAS Perception Orchestrator
//!
//! Drives one frame + depth map + detection list through the perception
//! pipeline and assembles a unified output record:
//! - Distance estimation for detections lacking one
//! - Collision warning analysis
//! - Lane detection and departure status
//! - Global closest point, proximity zone and rolling FPS

mod config;
mod report;

pub use config::PerceptionConfig;
pub use report::{FrameReport, ThreatSummary};

use collision_warning::CollisionWarning;
use distance_estimator::{DistanceError, DistanceEstimator};
use lane_keeping::{LaneError, LaneKeeping};
use std::collections::VecDeque;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;
use vision_frame::{DepthMap, Detection, VideoFrame};

/// Perception pipeline errors (configuration/geometry only; bad per-frame
/// data degrades inside the sub-engines)
#[derive(Debug, Clone, Error)]
pub enum PerceptionError {
    #[error(transparent)]
    Distance(#[from] DistanceError),

    #[error(transparent)]
    Lane(#[from] LaneError),
}

/// Unified per-frame perception engine.
///
/// Synchronous single-stream transform: one call per frame, no internal
/// concurrency. All cross-frame state lives in the sub-engines except the
/// rolling processing-time window used for the FPS estimate.
pub struct PerceptionEngine {
    config: PerceptionConfig,
    distance: DistanceEstimator,
    collision: CollisionWarning,
    lanes: LaneKeeping,
    frame_times_ms: VecDeque<f32>,
}

impl PerceptionEngine {
    /// Create the engine, validating the camera calibration
    pub fn new(config: PerceptionConfig) -> Result<Self, PerceptionError> {
        let distance = DistanceEstimator::new(config.calibration)?;
        let collision = CollisionWarning::new(config.collision.clone());
        let lanes = LaneKeeping::new(config.lane.clone());
        Ok(Self {
            config,
            distance,
            collision,
            lanes,
            frame_times_ms: VecDeque::new(),
        })
    }

    /// Update ego vehicle velocity for TTC calculation
    pub fn update_ego_velocity(&mut self, velocity_mps: f32) {
        self.collision.update_ego_velocity(velocity_mps);
    }

    /// Forget all cross-frame state (track and lane smoothing history)
    pub fn reset(&mut self) {
        self.collision.clear_history();
        self.lanes.clear_history();
        self.frame_times_ms.clear();
    }

    /// Access to the distance estimator (e.g. for recalibration)
    pub fn distance_estimator_mut(&mut self) -> &mut DistanceEstimator {
        &mut self.distance
    }

    /// Process a single frame through all perception modules.
    ///
    /// Detections without a pre-computed distance get one estimated from
    /// the depth map at their bounding box.
    pub fn process_frame(
        &mut self,
        frame: &VideoFrame,
        depth: &DepthMap,
        mut detections: Vec<Detection>,
        timestamp: f64,
        frame_id: u64,
    ) -> Result<FrameReport, PerceptionError> {
        let started = Instant::now();

        for detection in &mut detections {
            if detection.distance_m.is_none() {
                let d =
                    self.distance
                        .estimate_for_bbox(depth, &detection.bbox, self.config.bbox_method);
                detection.distance_m = Some(d);
            }
        }

        let warnings = self.collision.analyze(&detections, frame.width, timestamp);
        let lane_state = self.lanes.detect(frame)?;

        let (min_distance, _) = self.distance.closest_point(depth, None);
        let zone = self.distance.zone(min_distance);

        let processing_ms = started.elapsed().as_secs_f32() * 1000.0;
        self.frame_times_ms.push_back(processing_ms);
        while self.frame_times_ms.len() > self.config.fps_window {
            self.frame_times_ms.pop_front();
        }
        let avg_ms =
            self.frame_times_ms.iter().sum::<f32>() / self.frame_times_ms.len().max(1) as f32;
        let fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };

        debug!(
            frame_id,
            threats = warnings.active_threats.len(),
            lane_status = ?lane_state.departure_status,
            processing_ms,
            "Frame processed"
        );

        Ok(FrameReport::assemble(
            timestamp,
            frame_id,
            &warnings,
            &lane_state,
            min_distance,
            zone,
            fps,
            processing_ms,
            self.config.max_reported_threats,
        ))
    }
}
