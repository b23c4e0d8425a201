//! Binary lane-pixel mask construction

use image::RgbImage;
use imageproc::gradients::horizontal_sobel;
use ndarray::Array2;

/// HLS saturation band: colored lane paint
const SATURATION_MIN: u8 = 100;
/// HLS lightness band: white lane paint
const LIGHTNESS_MIN: u8 = 200;
/// LAB b* band: yellow lane paint
const LAB_B_RANGE: (u8, u8) = (145, 200);
/// Scaled horizontal-gradient band: faint or worn markings
const SOBEL_RANGE: (u8, u8) = (30, 150);

/// Build the binary lane-pixel mask for a rectified frame.
///
/// Four independent cues are OR-ed together: saturation and LAB-b catch
/// colored/yellow paint, lightness catches white paint, and the
/// horizontal gradient catches worn markings that fail color thresholds.
/// Output is (row, col) = (y, x), 1 = lane candidate.
pub fn lane_pixel_mask(warped: &RgbImage) -> Array2<u8> {
    let (w, h) = warped.dimensions();
    let mut mask = Array2::<u8>::zeros((h as usize, w as usize));

    for (x, y, px) in warped.enumerate_pixels() {
        let [r, g, b] = px.0;
        let (lightness, saturation) = hls_lightness_saturation(r, g, b);
        let lab_b = lab_b_channel(r, g, b);

        if saturation >= SATURATION_MIN
            || lightness >= LIGHTNESS_MIN
            || (LAB_B_RANGE.0..=LAB_B_RANGE.1).contains(&lab_b)
        {
            mask[(y as usize, x as usize)] = 1;
        }
    }

    // Gradient cue on the grayscale image, scaled to the 0-255 range
    let gray = image::imageops::grayscale(warped);
    let sobel = horizontal_sobel(&gray);
    let max_mag = sobel
        .pixels()
        .map(|p| (p.0[0] as i32).abs())
        .max()
        .unwrap_or(0);

    if max_mag > 0 {
        for (x, y, p) in sobel.enumerate_pixels() {
            let scaled = ((p.0[0] as i32).abs() * 255 / max_mag) as u8;
            if (SOBEL_RANGE.0..=SOBEL_RANGE.1).contains(&scaled) {
                mask[(y as usize, x as usize)] = 1;
            }
        }
    }

    mask
}

/// HLS lightness and saturation channels, 0-255 scale
fn hls_lightness_saturation(r: u8, g: u8, b: u8) -> (u8, u8) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;

    let saturation = if max <= min {
        0.0
    } else if lightness < 0.5 {
        (max - min) / (max + min)
    } else {
        (max - min) / (2.0 - max - min)
    };

    (
        (lightness * 255.0).round() as u8,
        (saturation * 255.0).round() as u8,
    )
}

/// CIELAB b* channel with the 8-bit +128 offset convention
fn lab_b_channel(r: u8, g: u8, b: u8) -> u8 {
    fn srgb_to_linear(c: u8) -> f32 {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    fn lab_f(t: f32) -> f32 {
        if t > 0.008856 {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    }

    let rl = srgb_to_linear(r);
    let gl = srgb_to_linear(g);
    let bl = srgb_to_linear(b);

    // sRGB D65 -> XYZ, normalized by the white point
    let y = (0.2126 * rl + 0.7152 * gl + 0.0722 * bl) / 1.0;
    let z = (0.0193 * rl + 0.1192 * gl + 0.9505 * bl) / 1.08883;

    let b_star = 200.0 * (lab_f(y) - lab_f(z));
    (b_star + 128.0).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> RgbImage {
        let mut img = RgbImage::new(w, h);
        for px in img.pixels_mut() {
            *px = Rgb(rgb);
        }
        img
    }

    #[test]
    fn test_white_paint_is_lane() {
        let (l, s) = hls_lightness_saturation(255, 255, 255);
        assert_eq!(l, 255);
        assert_eq!(s, 0);

        let img = solid(40, 40, [255, 255, 255]);
        let mask = lane_pixel_mask(&img);
        assert!(mask.iter().all(|&v| v == 1));
    }

    #[test]
    fn test_yellow_paint_is_lane() {
        // Strong yellow trips both the saturation and LAB-b cues
        let (_, s) = hls_lightness_saturation(230, 200, 30);
        assert!(s >= SATURATION_MIN);
        let b = lab_b_channel(230, 200, 30);
        assert!(b >= LAB_B_RANGE.0, "lab b = {b}");

        let img = solid(40, 40, [230, 200, 30]);
        let mask = lane_pixel_mask(&img);
        assert!(mask.iter().all(|&v| v == 1));
    }

    #[test]
    fn test_asphalt_gray_is_not_lane() {
        let img = solid(40, 40, [90, 90, 90]);
        let mask = lane_pixel_mask(&img);
        assert!(mask.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_gradient_cue_catches_faint_stripe() {
        // Gradient magnitudes are scaled by the frame maximum, so a faint
        // stripe registers in the band when a stronger edge sets the max.
        let mut img = solid(60, 60, [60, 60, 60]);
        for y in 0..60 {
            for x in 10..14 {
                img.put_pixel(x, y, Rgb([255, 255, 255])); // strong edge
            }
            for x in 40..44 {
                img.put_pixel(x, y, Rgb([90, 90, 90])); // faint stripe
            }
        }

        let mask = lane_pixel_mask(&img);
        // The faint stripe fails every color threshold but its edges pass
        // the scaled gradient band
        let edge_hits: usize = (5..55)
            .map(|y| (38..46).filter(|&x| mask[(y, x)] == 1).count())
            .sum();
        assert!(edge_hits > 0, "expected gradient hits along faint stripe");
    }
}
