//! Perspective rectification to a bird's-eye canvas

use crate::LaneError;
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use tracing::debug;

/// Bird's-eye canvas width (pixels)
pub const CANVAS_WIDTH: u32 = 400;
/// Bird's-eye canvas height (pixels)
pub const CANVAS_HEIGHT: u32 = 600;
/// Horizontal inset of the rectified lane region on the canvas
const CANVAS_INSET: f32 = 100.0;

/// Cached perspective mapping from a road trapezoid in the source image
/// to a fixed rectangular bird's-eye canvas.
///
/// The forward projection feeds rectification; the inverse is retained
/// for projecting results back into camera space (overlay use).
pub struct BirdsEyeView {
    forward: Projection,
    inverse: Projection,
    frame_width: u32,
    frame_height: u32,
}

impl BirdsEyeView {
    /// Compute the mapping for a frame geometry.
    ///
    /// The source trapezoid spans 15%..85% of the width at the bottom row
    /// and 45%..55% at `roi_top_ratio * height`.
    pub fn new(frame_width: u32, frame_height: u32, roi_top_ratio: f32) -> Result<Self, LaneError> {
        if frame_width == 0 || frame_height == 0 {
            return Err(LaneError::EmptyFrame(frame_width, frame_height));
        }

        let w = frame_width as f32;
        let h = frame_height as f32;
        let top_y = h * roi_top_ratio;

        let src = [
            (w * 0.15, h),     // bottom left
            (w * 0.45, top_y), // top left
            (w * 0.55, top_y), // top right
            (w * 0.85, h),     // bottom right
        ];
        let dst = [
            (CANVAS_INSET, CANVAS_HEIGHT as f32),
            (CANVAS_INSET, 0.0),
            (CANVAS_WIDTH as f32 - CANVAS_INSET, 0.0),
            (CANVAS_WIDTH as f32 - CANVAS_INSET, CANVAS_HEIGHT as f32),
        ];

        let forward = Projection::from_control_points(src, dst).ok_or(
            LaneError::DegeneratePerspective {
                width: frame_width,
                height: frame_height,
            },
        )?;
        let inverse = forward.invert();

        debug!(frame_width, frame_height, roi_top_ratio, "Computed perspective transform");

        Ok(Self {
            forward,
            inverse,
            frame_width,
            frame_height,
        })
    }

    /// Whether this mapping was computed for the given frame geometry
    pub fn matches(&self, frame_width: u32, frame_height: u32) -> bool {
        self.frame_width == frame_width && self.frame_height == frame_height
    }

    /// Warp a source frame onto the bird's-eye canvas
    pub fn rectify(&self, frame: &RgbImage) -> RgbImage {
        let mut canvas = RgbImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        warp_into(
            frame,
            &self.forward,
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
            &mut canvas,
        );
        canvas
    }

    /// Canvas-to-camera projection, for overlay rendering downstream
    pub fn inverse(&self) -> &Projection {
        &self.inverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_frame() {
        assert!(BirdsEyeView::new(0, 480, 0.55).is_err());
    }

    #[test]
    fn test_rectify_fills_canvas_from_trapezoid() {
        let view = BirdsEyeView::new(640, 480, 0.55).unwrap();
        // Uniform green frame: every canvas pixel sampled inside the frame
        // must be green
        let mut frame = RgbImage::new(640, 480);
        for px in frame.pixels_mut() {
            *px = Rgb([0, 200, 0]);
        }

        let canvas = view.rectify(&frame);
        assert_eq!(canvas.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        // Center of the rectified lane region
        assert_eq!(canvas.get_pixel(200, 300).0, [0, 200, 0]);
    }

    #[test]
    fn test_forward_maps_trapezoid_corners() {
        let view = BirdsEyeView::new(640, 480, 0.55).unwrap();
        // Bottom-left trapezoid corner lands at the canvas inset
        let (x, y) = view.forward * (96.0, 480.0);
        assert!((x - 100.0).abs() < 0.5);
        assert!((y - 600.0).abs() < 0.5);

        // Inverse takes it back
        let (sx, sy) = *view.inverse() * (x, y);
        assert!((sx - 96.0).abs() < 0.5);
        assert!((sy - 480.0).abs() < 0.5);
    }
}
