//! Polynomial fitting and temporal smoothing

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Minimum matched pixels to attempt a fit
const MIN_FIT_PIXELS: usize = 10;

/// Degree-2 lane polynomial x = a*y^2 + b*y + c.
///
/// Coefficients stored highest degree first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanePoly(pub [f64; 3]);

impl LanePoly {
    /// Evaluate x at the given y
    pub fn eval(&self, y: f64) -> f64 {
        let [a, b, c] = self.0;
        (a * y + b) * y + c
    }

    /// First derivative dx/dy at the given y
    pub fn slope(&self, y: f64) -> f64 {
        let [a, b, _] = self.0;
        2.0 * a * y + b
    }

    /// Element-wise mean of two polynomials
    pub fn midpoint(&self, other: &LanePoly) -> LanePoly {
        LanePoly([
            (self.0[0] + other.0[0]) / 2.0,
            (self.0[1] + other.0[1]) / 2.0,
            (self.0[2] + other.0[2]) / 2.0,
        ])
    }
}

/// Least-squares fit of x = f(y) to matched lane pixels.
///
/// Returns None with fewer than 10 pixels or a singular normal system
/// (collinear/degenerate input), never an error.
pub fn fit_polynomial(pixels: &[(f64, f64)]) -> Option<LanePoly> {
    if pixels.len() < MIN_FIT_PIXELS {
        return None;
    }

    // Normal equations for the design matrix [y^2, y, 1]
    let mut s = [0.0_f64; 5]; // sums of y^0 .. y^4
    let mut r = [0.0_f64; 3]; // sums of x*y^2, x*y, x
    for &(x, y) in pixels {
        let y2 = y * y;
        s[0] += 1.0;
        s[1] += y;
        s[2] += y2;
        s[3] += y2 * y;
        s[4] += y2 * y2;
        r[0] += x * y2;
        r[1] += x * y;
        r[2] += x;
    }

    let mut m = [
        [s[4], s[3], s[2], r[0]],
        [s[3], s[2], s[1], r[1]],
        [s[2], s[1], s[0], r[2]],
    ];

    // Gaussian elimination with partial pivoting
    for col in 0..3 {
        let pivot_row = (col..3)
            .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
            .unwrap_or(col);
        m.swap(col, pivot_row);

        if m[col][col].abs() < 1e-9 {
            return None; // rank-deficient: no fit this frame
        }

        for row in (col + 1)..3 {
            let factor = m[row][col] / m[col][col];
            for k in col..4 {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut coeffs = [0.0_f64; 3];
    for row in (0..3).rev() {
        let mut acc = m[row][3];
        for k in (row + 1)..3 {
            acc -= m[row][k] * coeffs[k];
        }
        coeffs[row] = acc / m[row][row];
    }

    if coeffs.iter().any(|c| !c.is_finite()) {
        return None;
    }

    Some(LanePoly(coeffs))
}

/// Bounded per-side polynomial history for temporal smoothing.
///
/// Reports the mean coefficient vector over the retained history; a frame
/// whose fit failed still reports the history mean, so a brief dropout
/// does not blank the lane.
#[derive(Debug)]
pub struct PolyHistory {
    depth: usize,
    entries: VecDeque<[f64; 3]>,
}

impl PolyHistory {
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            entries: VecDeque::with_capacity(depth),
        }
    }

    /// Push this frame's fit (if any) and return the smoothed polynomial
    pub fn push(&mut self, poly: Option<LanePoly>) -> Option<LanePoly> {
        if let Some(p) = poly {
            self.entries.push_back(p.0);
            while self.entries.len() > self.depth {
                self.entries.pop_front();
            }
        }
        self.mean()
    }

    /// Mean coefficient vector over retained history
    pub fn mean(&self) -> Option<LanePoly> {
        if self.entries.is_empty() {
            return None;
        }
        let n = self.entries.len() as f64;
        let mut acc = [0.0_f64; 3];
        for entry in &self.entries {
            acc[0] += entry[0];
            acc[1] += entry[1];
            acc[2] += entry[2];
        }
        Some(LanePoly([acc[0] / n, acc[1] / n, acc[2] / n]))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_recovers_quadratic() {
        let poly = LanePoly([0.001, 0.2, 50.0]);
        let pixels: Vec<(f64, f64)> = (0..600)
            .step_by(10)
            .map(|y| (poly.eval(y as f64), y as f64))
            .collect();

        let fit = fit_polynomial(&pixels).unwrap();
        assert!((fit.0[0] - 0.001).abs() < 1e-6);
        assert!((fit.0[1] - 0.2).abs() < 1e-4);
        assert!((fit.0[2] - 50.0).abs() < 1e-2);
    }

    #[test]
    fn test_fit_needs_ten_pixels() {
        let pixels: Vec<(f64, f64)> = (0..9).map(|y| (100.0, y as f64)).collect();
        assert!(fit_polynomial(&pixels).is_none());
    }

    #[test]
    fn test_fit_singular_input_is_none() {
        // All pixels on one scanline: design matrix is rank-deficient
        let pixels: Vec<(f64, f64)> = (0..20).map(|x| (x as f64, 250.0)).collect();
        assert!(fit_polynomial(&pixels).is_none());
    }

    #[test]
    fn test_history_mean_and_bound() {
        let mut history = PolyHistory::new(7);
        assert!(history.push(None).is_none());

        history.push(Some(LanePoly([0.0, 0.0, 100.0])));
        let smoothed = history.push(Some(LanePoly([0.0, 0.0, 200.0]))).unwrap();
        assert!((smoothed.0[2] - 150.0).abs() < 1e-9);

        // A missed frame still reports the retained mean
        let smoothed = history.push(None).unwrap();
        assert!((smoothed.0[2] - 150.0).abs() < 1e-9);

        // History never exceeds the configured depth
        for i in 0..20 {
            history.push(Some(LanePoly([0.0, 0.0, i as f64])));
        }
        assert_eq!(history.len(), 7);
        let smoothed = history.mean().unwrap();
        assert!((smoothed.0[2] - 16.0).abs() < 1e-9); // mean of 13..=19
    }

    #[test]
    fn test_more_history_more_stability() {
        // With a longer retained history, one outlier moves the mean less
        let mut short = PolyHistory::new(2);
        let mut long = PolyHistory::new(7);
        for _ in 0..7 {
            short.push(Some(LanePoly([0.0, 0.0, 100.0])));
            long.push(Some(LanePoly([0.0, 0.0, 100.0])));
        }
        let s = short.push(Some(LanePoly([0.0, 0.0, 170.0]))).unwrap();
        let l = long.push(Some(LanePoly([0.0, 0.0, 170.0]))).unwrap();
        assert!((l.0[2] - 100.0).abs() < (s.0[2] - 100.0).abs());
    }
}
