//! Collision Warning System
//!
//! Analyzes detected objects and their trajectories to generate collision
//! warnings with varying severity levels:
//! - Time-to-Collision (TTC) calculation from per-object track history
//! - Forward collision / pedestrian / cyclist / side warnings
//! - Multi-object prioritization into a single warning state

mod config;
mod engine;
mod threat;
mod track;

pub use config::CollisionConfig;
pub use engine::CollisionWarning;
pub use threat::{CollisionThreat, WarningLevel, WarningState, WarningType};
pub use track::{TrackHistory, TrackSample};
