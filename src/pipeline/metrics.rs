// src/pipeline/metrics.rs
//
// Observability counters for the analytics pipeline. Counters are shareable
// handles so an overlay or stats thread can read them while the pipeline
// runs. Export via summary() or logs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct AnalyticsMetrics {
    pub total_frames: Arc<AtomicU64>,
    pub detections_processed: Arc<AtomicU64>,
    pub events_appended: Arc<AtomicU64>,
    pub batches_flushed: Arc<AtomicU64>,
    pub events_flushed: Arc<AtomicU64>,
    pub flush_failures: Arc<AtomicU64>,
    pub tracks_pruned: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl AnalyticsMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: Arc::new(AtomicU64::new(0)),
            detections_processed: Arc::new(AtomicU64::new(0)),
            events_appended: Arc::new(AtomicU64::new(0)),
            batches_flushed: Arc::new(AtomicU64::new(0)),
            events_flushed: Arc::new(AtomicU64::new(0)),
            flush_failures: Arc::new(AtomicU64::new(0)),
            tracks_pruned: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.total_frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames.load(Ordering::Relaxed),
            fps: self.fps(),
            detections_processed: self.detections_processed.load(Ordering::Relaxed),
            events_appended: self.events_appended.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            events_flushed: self.events_flushed.load(Ordering::Relaxed),
            flush_failures: self.flush_failures.load(Ordering::Relaxed),
            tracks_pruned: self.tracks_pruned.load(Ordering::Relaxed),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for AnalyticsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub fps: f64,
    pub detections_processed: u64,
    pub events_appended: u64,
    pub batches_flushed: u64,
    pub events_flushed: u64,
    pub flush_failures: u64,
    pub tracks_pruned: u64,
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = AnalyticsMetrics::new();
        metrics.inc(&metrics.total_frames);
        metrics.inc(&metrics.total_frames);
        metrics.add(&metrics.events_flushed, 5);

        let summary = metrics.summary();
        assert_eq!(summary.total_frames, 2);
        assert_eq!(summary.events_flushed, 5);
        assert_eq!(summary.flush_failures, 0);
    }

    #[test]
    fn test_clone_shares_counters() {
        let metrics = AnalyticsMetrics::new();
        let handle = metrics.clone();
        metrics.inc(&metrics.events_appended);
        assert_eq!(handle.summary().events_appended, 1);
    }
}
