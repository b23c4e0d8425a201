//! Lane keeping engine: per-frame pipeline and metrics

use crate::config::LaneConfig;
use crate::fit::{fit_polynomial, LanePoly, PolyHistory};
use crate::mask::lane_pixel_mask;
use crate::search::sliding_window_search;
use crate::state::{LaneDepartureStatus, LaneState};
use crate::transform::{BirdsEyeView, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::LaneError;
use tracing::debug;
use vision_frame::VideoFrame;

/// Drift threshold (meters from lane center)
const DRIFT_THRESHOLD_M: f32 = 0.3;
/// Departure threshold (meters from lane center)
const DEPARTURE_THRESHOLD_M: f32 = 0.7;

/// Assumed lane width when only one side is visible (meters)
const DEFAULT_LANE_WIDTH_M: f64 = 3.5;
/// Pixels per meter at the bottom of the bird's-eye canvas
const PPM_BOTTOM: f64 = 100.0;
/// Minimum plausible lane width on the canvas (pixels)
const MIN_LANE_WIDTH_PX: f64 = 50.0;

/// Curvature radii beyond this read as straight road (meters)
pub const CURVATURE_CAP_M: f64 = 10_000.0;

/// Steering gain on center offset
const KP_OFFSET: f32 = 2.0;
/// Steering gain on heading angle
const KP_HEADING: f32 = 0.5;
/// Steering clamp (degrees)
const MAX_STEERING_DEG: f32 = 45.0;

/// Lane Keeping Assist engine.
///
/// Owns the cached perspective mapping and the per-side polynomial
/// history; everything else is recomputed per frame. One instance per
/// camera stream.
pub struct LaneKeeping {
    config: LaneConfig,
    view: Option<BirdsEyeView>,
    left_history: PolyHistory,
    right_history: PolyHistory,
}

impl LaneKeeping {
    /// Create a lane keeping engine from configuration
    pub fn new(config: LaneConfig) -> Self {
        let left_history = PolyHistory::new(config.history_depth);
        let right_history = PolyHistory::new(config.history_depth);
        Self {
            config,
            view: None,
            left_history,
            right_history,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &LaneConfig {
        &self.config
    }

    /// Forget smoothing history (e.g. on stream restart)
    pub fn clear_history(&mut self) {
        self.left_history.clear();
        self.right_history.clear();
    }

    /// Detect lanes and compute lane keeping metrics for one frame.
    ///
    /// A frame with no usable lane pixels yields `NO_LANE`; only a
    /// degenerate frame geometry is an error.
    pub fn detect(&mut self, frame: &VideoFrame) -> Result<LaneState, LaneError> {
        let view = match self.view.take() {
            Some(v) if v.matches(frame.width, frame.height) => v,
            _ => BirdsEyeView::new(frame.width, frame.height, self.config.roi_top_ratio)?,
        };

        let warped = view.rectify(&frame.to_rgb_image());
        self.view = Some(view);
        let mask = lane_pixel_mask(&warped);

        let midpoint = CANVAS_WIDTH as usize / 2;
        let left_pixels = sliding_window_search(&mask, 0, midpoint);
        let right_pixels = sliding_window_search(&mask, midpoint, CANVAS_WIDTH as usize);
        debug!(
            left_pixels = left_pixels.len(),
            right_pixels = right_pixels.len(),
            "Lane pixel search complete"
        );

        let left_fit = fit_polynomial(&left_pixels);
        let right_fit = fit_polynomial(&right_pixels);

        let (left, right) = if self.config.enable_smoothing {
            (
                self.left_history.push(left_fit),
                self.right_history.push(right_fit),
            )
        } else {
            (left_fit, right_fit)
        };

        Ok(self.compute_metrics(left, right))
    }

    /// Compute lane metrics from the (smoothed) side polynomials
    pub fn compute_metrics(
        &self,
        left_poly: Option<LanePoly>,
        right_poly: Option<LanePoly>,
    ) -> LaneState {
        let mut state = LaneState {
            left_poly,
            right_poly,
            ..Default::default()
        };

        state.confidence = match (left_poly.is_some(), right_poly.is_some()) {
            (true, true) => 1.0,
            (true, false) | (false, true) => 0.5,
            (false, false) => 0.0,
        };
        if state.confidence == 0.0 {
            state.departure_status = LaneDepartureStatus::NoLane;
            return state;
        }

        let y_eval = (CANVAS_HEIGHT - 1) as f64;
        let canvas_center = CANVAS_WIDTH as f64 / 2.0;

        match (left_poly, right_poly) {
            (Some(left), Some(right)) => {
                let left_x = left.eval(y_eval);
                let right_x = right.eval(y_eval);
                let lane_center = (left_x + right_x) / 2.0;

                let lane_width_px = right_x - left_x;
                if lane_width_px > MIN_LANE_WIDTH_PX {
                    let meters_per_pixel = DEFAULT_LANE_WIDTH_M / lane_width_px;
                    state.center_offset_m =
                        ((canvas_center - lane_center) * meters_per_pixel) as f32;
                    state.road_width_m = (lane_width_px * meters_per_pixel) as f32;
                }

                let center = left.midpoint(&right);
                state.center_poly = Some(center);
                state.curvature_radius_m = curvature_radius(&center, y_eval);
                state.heading_angle_deg = heading_angle(&center, y_eval);
            }
            (Some(left), None) => {
                // Estimate the lane center by offsetting half the assumed
                // lane width in pixel space
                let left_x = left.eval(y_eval);
                let estimated_center = left_x + PPM_BOTTOM * DEFAULT_LANE_WIDTH_M / 2.0;
                state.center_offset_m = ((canvas_center - estimated_center) / PPM_BOTTOM) as f32;
            }
            (None, Some(right)) => {
                let right_x = right.eval(y_eval);
                let estimated_center = right_x - PPM_BOTTOM * DEFAULT_LANE_WIDTH_M / 2.0;
                state.center_offset_m = ((canvas_center - estimated_center) / PPM_BOTTOM) as f32;
            }
            (None, None) => unreachable!("confidence checked above"),
        }

        state.departure_status = classify_departure(state.center_offset_m);
        state.suggested_steering_deg =
            (KP_OFFSET * state.center_offset_m + KP_HEADING * state.heading_angle_deg)
                .clamp(-MAX_STEERING_DEG, MAX_STEERING_DEG);

        state
    }
}

/// Departure classification from the thresholded center offset
fn classify_departure(offset_m: f32) -> LaneDepartureStatus {
    if offset_m.abs() > DEPARTURE_THRESHOLD_M {
        if offset_m > 0.0 {
            LaneDepartureStatus::DepartedRight
        } else {
            LaneDepartureStatus::DepartedLeft
        }
    } else if offset_m.abs() > DRIFT_THRESHOLD_M {
        if offset_m > 0.0 {
            LaneDepartureStatus::DriftingRight
        } else {
            LaneDepartureStatus::DriftingLeft
        }
    } else {
        LaneDepartureStatus::Centered
    }
}

/// Radius of curvature at the given y, scaled to meters.
///
/// R = (1 + (dx/dy)^2)^(3/2) / |d2x/dy2|; near-zero second derivative
/// reads as straight road.
fn curvature_radius(poly: &LanePoly, y_eval: f64) -> f32 {
    let d1 = poly.slope(y_eval);
    let d2 = 2.0 * poly.0[0];

    if d2.abs() < 1e-6 {
        return f32::INFINITY;
    }

    let radius_px = (1.0 + d1 * d1).powf(1.5) / d2.abs();
    (radius_px / PPM_BOTTOM).min(CURVATURE_CAP_M) as f32
}

/// Heading angle relative to the lane at the given y (degrees)
fn heading_angle(poly: &LanePoly, y_eval: f64) -> f32 {
    poly.slope(y_eval).atan().to_degrees() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical(x: f64) -> LanePoly {
        LanePoly([0.0, 0.0, x])
    }

    fn engine() -> LaneKeeping {
        LaneKeeping::new(LaneConfig::default())
    }

    #[test]
    fn test_no_lane_when_both_sides_missing() {
        let state = engine().compute_metrics(None, None);
        assert_eq!(state.departure_status, LaneDepartureStatus::NoLane);
        assert_eq!(state.confidence, 0.0);
        assert_eq!(state.suggested_steering_deg, 0.0);
    }

    #[test]
    fn test_centered_lane() {
        // left_x = 100, right_x = 300 at the canvas bottom: lane center
        // coincides with the canvas center
        let state = engine().compute_metrics(Some(vertical(100.0)), Some(vertical(300.0)));

        assert_eq!(state.confidence, 1.0);
        assert!(state.center_offset_m.abs() < 1e-6);
        assert_eq!(state.departure_status, LaneDepartureStatus::Centered);
        assert!((state.road_width_m - 3.5).abs() < 1e-5);
        assert_eq!(state.curvature_radius_m, f32::INFINITY);
        assert_eq!(state.heading_angle_deg, 0.0);
    }

    #[test]
    fn test_offset_lane_drifting_and_departed() {
        // Lane shifted so the vehicle sits right of center:
        // width 200px -> 0.0175 m/px; center at 170 -> offset +0.525m
        let state = engine().compute_metrics(Some(vertical(70.0)), Some(vertical(270.0)));
        assert!((state.center_offset_m - 0.525).abs() < 1e-3);
        assert_eq!(state.departure_status, LaneDepartureStatus::DriftingRight);

        // Center at 150 -> offset +0.875m -> departed
        let state = engine().compute_metrics(Some(vertical(50.0)), Some(vertical(250.0)));
        assert!((state.center_offset_m - 0.875).abs() < 1e-3);
        assert_eq!(state.departure_status, LaneDepartureStatus::DepartedRight);

        // Mirrored: vehicle left of center
        let state = engine().compute_metrics(Some(vertical(150.0)), Some(vertical(350.0)));
        assert_eq!(state.departure_status, LaneDepartureStatus::DepartedLeft);
    }

    #[test]
    fn test_single_left_side_estimate() {
        // Left at x=150: implied center shifts by half the default lane
        // width in pixel space (175 px)
        let state = engine().compute_metrics(Some(vertical(150.0)), None);

        assert_eq!(state.confidence, 0.5);
        let expected = (200.0 - (150.0 + 175.0)) / 100.0;
        assert!((state.center_offset_m - expected as f32).abs() < 1e-5);
        assert_eq!(state.departure_status, LaneDepartureStatus::DepartedLeft);
    }

    #[test]
    fn test_single_right_side_estimate() {
        let state = engine().compute_metrics(None, Some(vertical(250.0)));

        assert_eq!(state.confidence, 0.5);
        let expected = (200.0 - (250.0 - 175.0)) / 100.0;
        assert!((state.center_offset_m - expected as f32).abs() < 1e-5);
        assert_eq!(state.departure_status, LaneDepartureStatus::DepartedRight);
    }

    #[test]
    fn test_implausibly_narrow_lane_keeps_defaults() {
        // Width below 50px is not trusted: offset stays 0, width default
        let state = engine().compute_metrics(Some(vertical(190.0)), Some(vertical(220.0)));
        assert_eq!(state.center_offset_m, 0.0);
        assert!((state.road_width_m - 3.5).abs() < 1e-6);
        assert_eq!(state.departure_status, LaneDepartureStatus::Centered);
    }

    #[test]
    fn test_curved_lane_metrics() {
        // Matching curvature on both sides
        let left = LanePoly([1e-4, 0.0, 100.0]);
        let right = LanePoly([1e-4, 0.0, 300.0]);
        let state = engine().compute_metrics(Some(left), Some(right));

        assert!(state.curvature_radius_m.is_finite());
        assert!(state.curvature_radius_m > 0.0);
        assert!(state.curvature_radius_m <= 10_000.0);
        // Curving right at the bottom: positive slope -> positive heading
        assert!(state.heading_angle_deg > 0.0);
    }

    #[test]
    fn test_steering_is_proportional_and_clamped() {
        // offset +0.525m, zero heading -> steering = 2.0 * 0.525
        let state = engine().compute_metrics(Some(vertical(70.0)), Some(vertical(270.0)));
        assert!((state.suggested_steering_deg - 1.05).abs() < 1e-3);

        // Extreme single-side offset cannot exceed the clamp
        let state = engine().compute_metrics(Some(vertical(10_000.0)), None);
        assert!(state.suggested_steering_deg >= -45.0);
        assert!(state.suggested_steering_deg <= 45.0);
    }

    #[test]
    fn test_detect_on_featureless_frame_is_no_lane() {
        let mut lka = engine();
        let frame = vision_frame::VideoFrame::filled(320, 240, [80, 80, 80]).unwrap();

        let state = lka.detect(&frame).unwrap();
        assert_eq!(state.departure_status, LaneDepartureStatus::NoLane);
        assert_eq!(state.confidence, 0.0);
    }

    #[test]
    fn test_detect_recomputes_perspective_on_resize() {
        let mut lka = engine();
        let small = vision_frame::VideoFrame::filled(320, 240, [80, 80, 80]).unwrap();
        let large = vision_frame::VideoFrame::filled(640, 480, [80, 80, 80]).unwrap();

        lka.detect(&small).unwrap();
        lka.detect(&large).unwrap();
        assert!(lka.view.as_ref().unwrap().matches(640, 480));
    }

    #[test]
    fn test_detect_smooths_across_frames() {
        // A featureless frame after a detected one must not blank the
        // lane: smoothing history carries the last fit
        let mut lka = engine();
        lka.left_history.push(Some(vertical(100.0)));
        lka.right_history.push(Some(vertical(300.0)));

        let frame = vision_frame::VideoFrame::filled(320, 240, [80, 80, 80]).unwrap();
        let state = lka.detect(&frame).unwrap();
        assert_eq!(state.confidence, 1.0);
        assert_eq!(state.departure_status, LaneDepartureStatus::Centered);
    }
}
