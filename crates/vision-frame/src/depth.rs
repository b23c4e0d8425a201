//! Normalized depth map

use crate::FrameError;
use ndarray::{Array2, ArrayView2};

/// Normalized depth map, same resolution as the camera frame.
///
/// Values are in [0, 1] with higher values meaning closer, matching the
/// output convention of monocular depth networks. Samples are clamped into
/// range at construction so downstream math never sees out-of-range depth.
#[derive(Debug, Clone)]
pub struct DepthMap {
    data: Array2<f32>,
}

impl DepthMap {
    /// Build a depth map from a raw array, clamping samples to [0, 1]
    pub fn from_array(mut data: Array2<f32>) -> Result<Self, FrameError> {
        let (h, w) = data.dim();
        if h == 0 || w == 0 {
            return Err(FrameError::EmptyFrame(w as u32, h as u32));
        }
        data.mapv_inplace(|d| d.clamp(0.0, 1.0));
        Ok(Self { data })
    }

    /// Uniform depth map, useful for tests and calibration targets
    pub fn constant(width: usize, height: usize, depth: f32) -> Result<Self, FrameError> {
        Self::from_array(Array2::from_elem((height, width), depth))
    }

    /// Map width in pixels
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    /// Map height in pixels
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Depth sample at (x, y), None when out of bounds
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.data.get((y, x)).copied()
    }

    /// Borrow the underlying (row, col) = (y, x) array
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_out_of_range_samples() {
        let raw = Array2::from_shape_vec((2, 2), vec![-0.5, 0.3, 1.7, 1.0]).unwrap();
        let map = DepthMap::from_array(raw).unwrap();

        assert_eq!(map.get(0, 0), Some(0.0));
        assert_eq!(map.get(1, 0), Some(0.3));
        assert_eq!(map.get(0, 1), Some(1.0));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(DepthMap::from_array(Array2::zeros((0, 5))).is_err());
        assert!(DepthMap::constant(0, 0, 0.5).is_err());
    }

    #[test]
    fn test_indexing_is_x_y() {
        let mut raw = Array2::zeros((4, 6));
        raw[(1, 3)] = 0.7; // row 1 = y, col 3 = x
        let map = DepthMap::from_array(raw).unwrap();

        assert_eq!(map.width(), 6);
        assert_eq!(map.height(), 4);
        assert_eq!(map.get(3, 1), Some(0.7));
        assert_eq!(map.get(6, 0), None);
    }
}
