//! Video frame type and pixel access

use crate::FrameError;
use image::RgbImage;

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp_ns: u64,
        sequence: u32,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyFrame(width, height));
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
                width,
                height,
            });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        })
    }

    /// Create a frame filled with a single RGB color
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, FrameError> {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgb);
        }
        Self::new(data, width, height, 0, 0)
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Convert to grayscale
    pub fn to_grayscale(&self) -> Vec<u8> {
        let mut gray = Vec::with_capacity((self.width * self.height) as usize);
        for pixel in self.data.chunks(3) {
            // Luminance formula: 0.299*R + 0.587*G + 0.114*B
            let y = (pixel[0] as f32 * 0.299
                + pixel[1] as f32 * 0.587
                + pixel[2] as f32 * 0.114) as u8;
            gray.push(y);
        }
        gray
    }

    /// Bridge into the `image` crate for warping and gradient filters
    pub fn to_rgb_image(&self) -> RgbImage {
        // Dimensions are validated at construction, so this cannot fail
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_buffer() {
        assert!(VideoFrame::new(vec![0; 10], 4, 4, 0, 0).is_err());
        assert!(VideoFrame::new(vec![0; 48], 4, 4, 0, 0).is_ok());
        assert!(VideoFrame::new(vec![], 0, 4, 0, 0).is_err());
    }

    #[test]
    fn test_new_validates_huge_dimensions() {
        // width * height * 3 exceeds u32::MAX; the length check must not
        // wrap around and accept a short buffer
        let frame = VideoFrame::new(vec![0; 12], 70_000, 70_000, 0, 0);
        assert!(matches!(frame, Err(FrameError::BufferSize { .. })));
    }

    #[test]
    fn test_get_pixel() {
        let mut data = vec![0u8; 48];
        let idx = ((1 * 4 + 2) * 3) as usize;
        data[idx] = 255;
        let frame = VideoFrame::new(data, 4, 4, 0, 0).unwrap();

        assert_eq!(frame.get_pixel(2, 1), Some([255, 0, 0]));
        assert_eq!(frame.get_pixel(4, 0), None);
    }

    #[test]
    fn test_roundtrip_rgb_image() {
        let frame = VideoFrame::filled(8, 6, [10, 20, 30]).unwrap();
        let img = frame.to_rgb_image();
        assert_eq!(img.dimensions(), (8, 6));
        assert_eq!(img.get_pixel(3, 3).0, [10, 20, 30]);
    }
}
