//! Per-Frame Perception Inputs
//!
//! Shared input contract for the ADAS perception pipeline:
//! - Raw RGB video frames
//! - Normalized depth maps (higher value = closer)
//! - Typed object detections with pixel bounding boxes

mod depth;
mod detection;
mod frame;

pub use depth::DepthMap;
pub use detection::{BoundingBox, Detection, ObjectClass};
pub use frame::VideoFrame;

use thiserror::Error;

/// Errors constructing frame inputs
#[derive(Debug, Clone, Error)]
pub enum FrameError {
    /// Buffer length does not match declared dimensions
    #[error("Frame buffer has {actual} bytes, expected {expected} for {width}x{height} RGB")]
    BufferSize {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
    },

    /// Zero-sized frame or depth map
    #[error("Empty frame: {0}x{1}")]
    EmptyFrame(u32, u32),
}
