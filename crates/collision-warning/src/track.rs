//! Per-object tracking history

use std::collections::{HashMap, VecDeque};

/// One distance observation for a tracked object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    /// Observation timestamp (seconds)
    pub timestamp: f64,
    /// Distance to object (meters)
    pub distance_m: f32,
    /// Lateral offset from centerline (meters)
    pub lateral_m: f32,
}

/// Bounded time-windowed sample history keyed by track id.
///
/// Samples older than the window are pruned on push; `sweep` drops tracks
/// whose samples have all aged out, so memory stays bounded even when a
/// track stops being observed.
#[derive(Debug, Default)]
pub struct TrackHistory {
    window_s: f64,
    tracks: HashMap<u64, VecDeque<TrackSample>>,
}

impl TrackHistory {
    /// History with the given sliding window in seconds
    pub fn new(window_s: f64) -> Self {
        Self {
            window_s,
            tracks: HashMap::new(),
        }
    }

    /// Record an observation and prune entries outside the window
    pub fn push(&mut self, id: u64, sample: TrackSample) {
        let samples = self.tracks.entry(id).or_default();
        samples.push_back(sample);

        let cutoff = sample.timestamp - self.window_s;
        while samples.front().is_some_and(|s| s.timestamp <= cutoff) {
            samples.pop_front();
        }
    }

    /// Estimate relative velocity as the secant slope between the first
    /// and last retained samples (m/s, negative = approaching).
    ///
    /// Returns 0 with fewer than 2 samples or a near-zero time base.
    pub fn velocity(&self, id: u64) -> f32 {
        let Some(samples) = self.tracks.get(&id) else {
            return 0.0;
        };
        let (Some(first), Some(last)) = (samples.front(), samples.back()) else {
            return 0.0;
        };
        if samples.len() < 2 {
            return 0.0;
        }

        let dt = last.timestamp - first.timestamp;
        if dt < 0.01 {
            return 0.0;
        }

        ((last.distance_m - first.distance_m) as f64 / dt) as f32
    }

    /// Drop tracks whose samples have all aged out of the window
    pub fn sweep(&mut self, now: f64) {
        let cutoff = now - self.window_s;
        self.tracks.retain(|_, samples| {
            while samples.front().is_some_and(|s| s.timestamp <= cutoff) {
                samples.pop_front();
            }
            !samples.is_empty()
        });
    }

    /// Number of live tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Retained samples for a track
    pub fn samples(&self, id: u64) -> Option<&VecDeque<TrackSample>> {
        self.tracks.get(&id)
    }

    /// Forget all tracks
    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp: f64, distance_m: f32) -> TrackSample {
        TrackSample {
            timestamp,
            distance_m,
            lateral_m: 0.0,
        }
    }

    #[test]
    fn test_velocity_needs_two_samples() {
        let mut history = TrackHistory::new(1.0);
        assert_eq!(history.velocity(1), 0.0);

        history.push(1, sample(0.0, 10.0));
        assert_eq!(history.velocity(1), 0.0);

        history.push(1, sample(0.5, 8.0));
        assert!((history.velocity(1) - (-4.0)).abs() < 1e-5);
    }

    #[test]
    fn test_velocity_guards_tiny_dt() {
        let mut history = TrackHistory::new(1.0);
        history.push(1, sample(0.0, 10.0));
        history.push(1, sample(0.005, 9.0));
        assert_eq!(history.velocity(1), 0.0);
    }

    #[test]
    fn test_push_prunes_old_samples() {
        let mut history = TrackHistory::new(1.0);
        history.push(1, sample(0.0, 20.0));
        history.push(1, sample(0.5, 18.0));
        history.push(1, sample(1.6, 15.0)); // first two age out

        let samples = history.samples(1).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples.front().unwrap().timestamp, 1.6);
    }

    #[test]
    fn test_sweep_drops_stale_tracks() {
        let mut history = TrackHistory::new(1.0);
        history.push(1, sample(0.0, 20.0));
        history.push(2, sample(4.9, 12.0));
        assert_eq!(history.len(), 2);

        history.sweep(5.0);
        assert_eq!(history.len(), 1);
        assert!(history.samples(1).is_none());
        assert!(history.samples(2).is_some());
    }
}
