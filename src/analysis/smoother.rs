// src/analysis/smoother.rs
//
// Per-track speed smoothing. Two pieces of state per track:
//   - a bounded window of the most recent per-frame samples
//   - a per-second bucket that collapses to its median on every tick
//
// The tick cadence is owned by the orchestrator's shared flush gate; the
// smoother itself has no clock. Between ticks the head of the bucket is the
// track's representative speed.

use std::collections::{HashMap, VecDeque};
use tracing::debug;

pub struct SpeedSmoother {
    window_length: usize,
    windows: HashMap<u64, VecDeque<u32>>,
    second_buckets: HashMap<u64, Vec<f64>>,
}

impl SpeedSmoother {
    pub fn new(window_length: usize) -> Self {
        Self {
            window_length,
            windows: HashMap::new(),
            second_buckets: HashMap::new(),
        }
    }

    /// Record one per-frame speed sample for a track
    pub fn record(&mut self, track_id: u64, speed: u32) {
        let window = self.windows.entry(track_id).or_default();
        window.push_back(speed);
        if window.len() > self.window_length {
            window.pop_front();
        }

        self.second_buckets
            .entry(track_id)
            .or_default()
            .push(speed as f64);
    }

    /// Collapse every non-empty second bucket to its median. Called once per
    /// elapsed second by the shared flush gate.
    pub fn tick(&mut self) {
        for (track_id, bucket) in self.second_buckets.iter_mut() {
            if bucket.is_empty() {
                continue;
            }
            let m = median(bucket);
            debug!(
                "Track {}: {} samples this second, median {:.1} km/h",
                track_id,
                bucket.len(),
                m
            );
            bucket.clear();
            bucket.push(m);
        }
    }

    /// Current representative speed; 0 before any sample has been recorded
    pub fn representative_speed(&self, track_id: u64) -> f64 {
        self.second_buckets
            .get(&track_id)
            .and_then(|bucket| bucket.first())
            .copied()
            .unwrap_or(0.0)
    }

    /// Recent per-frame samples for a track, oldest first
    pub fn window(&self, track_id: u64) -> Option<&VecDeque<u32>> {
        self.windows.get(&track_id)
    }

    /// Samples accumulated since the last tick (after a tick: the median)
    pub fn bucket_len(&self, track_id: u64) -> usize {
        self.second_buckets.get(&track_id).map_or(0, Vec::len)
    }

    /// Drop smoothing state for tracks the history store no longer holds
    pub fn retain_tracks(&mut self, is_live: impl Fn(u64) -> bool) {
        self.windows.retain(|track_id, _| is_live(*track_id));
        self.second_buckets.retain(|track_id, _| is_live(*track_id));
    }
}

/// Statistical median: mean of the two middle values for even-length input
fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_evicts_oldest_beyond_length() {
        let mut smoother = SpeedSmoother::new(5);
        for speed in [10, 20, 30, 40, 50, 60, 70] {
            smoother.record(3, speed);
        }
        let window = smoother.window(3).unwrap();
        assert_eq!(window.len(), 5);
        assert_eq!(window.front(), Some(&30));
        assert_eq!(window.back(), Some(&70));
    }

    #[test]
    fn test_representative_speed_zero_before_any_sample() {
        let smoother = SpeedSmoother::new(5);
        assert_eq!(smoother.representative_speed(12), 0.0);
    }

    #[test]
    fn test_tick_collapses_bucket_to_median() {
        let mut smoother = SpeedSmoother::new(5);
        for speed in [30, 50, 40] {
            smoother.record(3, speed);
        }
        assert_eq!(smoother.bucket_len(3), 3);

        smoother.tick();
        assert_eq!(smoother.bucket_len(3), 1);
        assert_eq!(smoother.representative_speed(3), 40.0);
    }

    #[test]
    fn test_even_count_median_averages_middle_pair() {
        let mut smoother = SpeedSmoother::new(5);
        for speed in [10, 20, 30, 40] {
            smoother.record(3, speed);
        }
        smoother.tick();
        assert_eq!(smoother.representative_speed(3), 25.0);
    }

    #[test]
    fn test_tick_is_idempotent_until_new_samples() {
        let mut smoother = SpeedSmoother::new(5);
        smoother.record(3, 30);
        smoother.record(3, 60);
        smoother.tick();
        assert_eq!(smoother.representative_speed(3), 45.0);

        // The bucket now holds only the median; another tick keeps it
        smoother.tick();
        assert_eq!(smoother.bucket_len(3), 1);
        assert_eq!(smoother.representative_speed(3), 45.0);
    }

    #[test]
    fn test_tick_leaves_other_tracks_untouched() {
        let mut smoother = SpeedSmoother::new(5);
        smoother.record(1, 20);
        smoother.tick();
        smoother.record(2, 80);
        assert_eq!(smoother.representative_speed(1), 20.0);
        assert_eq!(smoother.bucket_len(2), 1);
        assert_eq!(smoother.representative_speed(2), 80.0);
    }

    #[test]
    fn test_retain_tracks_drops_dead_state() {
        let mut smoother = SpeedSmoother::new(5);
        smoother.record(1, 20);
        smoother.record(2, 40);
        smoother.retain_tracks(|id| id == 2);
        assert!(smoother.window(1).is_none());
        assert_eq!(smoother.representative_speed(1), 0.0);
        assert!(smoother.window(2).is_some());
    }
}
