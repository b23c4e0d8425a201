//! Sliding-window lane pixel search

use ndarray::Array2;

/// Number of vertical search windows
const N_WINDOWS: usize = 9;
/// Half-width of each search window (pixels)
const WINDOW_MARGIN: usize = 50;
/// Pixels required in a window before recentering on their mean
const RECENTER_MIN_PIXELS: usize = 50;

/// Find lane pixels in one half of the binary mask.
///
/// Seeds the window position from the histogram peak of the bottom
/// quarter within `[col_start, col_end)`, then walks 9 windows from the
/// bottom up, recentering each on the mean x of its pixels when enough
/// are found. Returns matched (x, y) coordinates in full-mask space;
/// an empty histogram yields no pixels.
pub fn sliding_window_search(
    mask: &Array2<u8>,
    col_start: usize,
    col_end: usize,
) -> Vec<(f64, f64)> {
    let h = mask.nrows();
    let col_end = col_end.min(mask.ncols());
    if col_start >= col_end || h == 0 {
        return Vec::new();
    }

    // Histogram peak over the bottom quarter seeds the first window
    let mut best_col = col_start;
    let mut best_count = 0usize;
    for col in col_start..col_end {
        let count = (3 * h / 4..h).filter(|&row| mask[(row, col)] != 0).count();
        if count > best_count {
            best_count = count;
            best_col = col;
        }
    }
    if best_count == 0 {
        return Vec::new();
    }

    let window_height = h / N_WINDOWS;
    let mut current = best_col;
    let mut matched: Vec<(f64, f64)> = Vec::new();

    for window in 0..N_WINDOWS {
        let y_low = h.saturating_sub((window + 1) * window_height);
        let y_high = h - window * window_height;
        let x_low = current.saturating_sub(WINDOW_MARGIN).max(col_start);
        let x_high = (current + WINDOW_MARGIN).min(col_end);

        let mut sum_x = 0usize;
        let mut count = 0usize;
        for row in y_low..y_high {
            for col in x_low..x_high {
                if mask[(row, col)] != 0 {
                    matched.push((col as f64, row as f64));
                    sum_x += col;
                    count += 1;
                }
            }
        }

        if count > RECENTER_MIN_PIXELS {
            current = sum_x / count;
        }
    }

    matched
}
