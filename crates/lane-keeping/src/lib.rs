//! Lane Keeping Assist System
//!
//! Detects lane markings and provides departure warnings and steering
//! suggestions to keep the vehicle centered:
//! - Perspective rectification to a bird's-eye canvas
//! - Multi-cue binary lane-pixel mask (color + gradient)
//! - Sliding-window pixel search and polynomial fitting
//! - Temporal smoothing, curvature and heading analysis

mod config;
mod engine;
mod fit;
mod mask;
mod search;
mod state;
mod transform;

pub use config::LaneConfig;
pub use engine::{LaneKeeping, CURVATURE_CAP_M};
pub use fit::{fit_polynomial, LanePoly, PolyHistory};
pub use mask::lane_pixel_mask;
pub use search::sliding_window_search;
pub use state::{LaneDepartureStatus, LaneState};
pub use transform::BirdsEyeView;

use thiserror::Error;

/// Lane detection errors.
///
/// Missing lane pixels or failed fits are not errors; they degrade to
/// `NO_LANE` / a `None` polynomial for the frame.
#[derive(Debug, Clone, Error)]
pub enum LaneError {
    /// Perspective control points do not define an invertible mapping
    #[error("Degenerate perspective geometry for {width}x{height} frame")]
    DegeneratePerspective { width: u32, height: u32 },

    /// Zero-sized input frame
    #[error("Empty frame: {0}x{1}")]
    EmptyFrame(u32, u32),
}
