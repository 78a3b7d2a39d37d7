// src/pipeline/orchestrator.rs
//
// Frame-sequential driver. Owns every piece of mutable analytics state —
// history store, smoother, crossing counters, event buffer, flush timestamp —
// so nothing lives in process-wide globals and a test can replay a stream
// deterministically through a synthetic wall clock.
//
// Per detection with a known previous position, the order is fixed:
// estimate speed, record it, run the shared flush gate, classify the
// crossing, buffer the event. The gate runs before the append, so an event
// arriving just past the second boundary flushes the prior second's batch
// without riding along in it.

use crate::analysis::crossing::{boundary_y, CrossingDetector};
use crate::analysis::position_history::PositionHistoryStore;
use crate::analysis::smoother::SpeedSmoother;
use crate::analysis::speed;
use crate::pipeline::batcher::EventBatcher;
use crate::pipeline::metrics::AnalyticsMetrics;
use crate::sink::EventSink;
use crate::types::{
    class_name, AnalyticsEvent, Config, CrossingLabel, FrameInput, FrameReport, TrackAnnotation,
};
use chrono::{DateTime, Duration, Local};
use tracing::info;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct AnalyticsPipeline {
    config: Config,
    history: PositionHistoryStore,
    smoother: SpeedSmoother,
    crossing: CrossingDetector,
    batcher: EventBatcher,
    metrics: AnalyticsMetrics,
    /// Shared once-per-interval gate timestamp; seeded by the first frame
    last_flush: Option<DateTime<Local>>,
    frame_dims: Option<(u32, u32)>,
    boundary_y: i32,
}

impl AnalyticsPipeline {
    pub fn new(config: Config) -> Self {
        let history = PositionHistoryStore::new(config.history.track_ttl_frames);
        let smoother = SpeedSmoother::new(config.analytics.speed_window_length);
        Self {
            config,
            history,
            smoother,
            crossing: CrossingDetector::new(),
            batcher: EventBatcher::new(),
            metrics: AnalyticsMetrics::new(),
            last_flush: None,
            frame_dims: None,
            boundary_y: 0,
        }
    }

    /// Process one frame of tracked detections. Flushes due batches into
    /// `sink` as a side effect and returns the overlay data for the frame.
    pub fn process_frame(&mut self, frame: &FrameInput, sink: &mut dyn EventSink) -> FrameReport {
        self.metrics.inc(&self.metrics.total_frames);
        self.refresh_boundary(frame.frame_width, frame.frame_height);
        if self.last_flush.is_none() {
            self.last_flush = Some(frame.wall_clock);
        }

        let timestamp = frame.wall_clock.format(TIMESTAMP_FORMAT).to_string();
        let mut annotations = Vec::with_capacity(frame.detections.len());
        let mut events_flushed = 0;
        let mut gate_checked = false;

        for det in &frame.detections {
            if !self.config.history.vehicle_class_ids.is_empty()
                && !self.config.history.vehicle_class_ids.contains(&det.class_id)
            {
                continue;
            }
            self.metrics.inc(&self.metrics.detections_processed);

            let position = det.centroid();
            let previous = self.history.update(det.track_id, position, frame.frame_id);

            let mut label = CrossingLabel::Unknown;
            if let Some(previous) = previous {
                let sample =
                    speed::estimate(previous, position, self.config.analytics.calibration_factor);
                self.smoother.record(det.track_id, sample);

                events_flushed += self.run_flush_gate(frame.wall_clock, sink);
                gate_checked = true;

                let state = self.history.crossing_state(det.track_id);
                let (next_state, emitted) = self.crossing.check(
                    det.track_id,
                    previous.1,
                    position.1,
                    self.boundary_y,
                    state,
                );
                self.history.set_crossing_state(det.track_id, next_state);
                label = emitted;

                self.batcher.append(AnalyticsEvent {
                    object_class: class_name(det.class_id).to_string(),
                    track_id: det.track_id,
                    median_speed: self.smoother.representative_speed(det.track_id),
                    timestamp: timestamp.clone(),
                    crossing_label: label,
                });
                self.metrics.inc(&self.metrics.events_appended);
            }

            annotations.push(TrackAnnotation {
                track_id: det.track_id,
                object_class: class_name(det.class_id),
                bbox: det.bbox,
                display_speed: self.smoother.representative_speed(det.track_id),
                crossing_label: label,
            });
        }

        // A due flush must happen even on frames with no eligible detections
        if !gate_checked {
            events_flushed += self.run_flush_gate(frame.wall_clock, sink);
        }

        let pruned = self.history.prune(frame.frame_id);
        if pruned > 0 {
            self.metrics.add(&self.metrics.tracks_pruned, pruned as u64);
            let history = &self.history;
            self.smoother.retain_tracks(|track_id| history.contains(track_id));
        }

        FrameReport {
            frame_id: frame.frame_id,
            boundary_y: self.boundary_y,
            annotations,
            vehicles_entering: self.crossing.vehicles_entering(),
            vehicles_exiting: self.crossing.vehicles_exiting(),
            events_flushed,
        }
    }

    /// Collapse the current second's buckets and flush whatever is pending,
    /// regardless of the gate. For end-of-stream teardown.
    pub fn flush_pending(&mut self, sink: &mut dyn EventSink) -> usize {
        self.smoother.tick();
        self.settle_flush(sink)
    }

    pub fn pending_events(&self) -> usize {
        self.batcher.pending_count()
    }

    pub fn tracked_count(&self) -> usize {
        self.history.len()
    }

    pub fn boundary_y(&self) -> i32 {
        self.boundary_y
    }

    pub fn metrics(&self) -> &AnalyticsMetrics {
        &self.metrics
    }

    fn refresh_boundary(&mut self, width: u32, height: u32) {
        if self.frame_dims == Some((width, height)) {
            return;
        }
        self.boundary_y = boundary_y(height, self.config.boundary.offset_px);
        if self.frame_dims.is_some() {
            info!(
                "Frame dimensions changed to {}x{}, boundary line moved to y={}",
                width, height, self.boundary_y
            );
        } else {
            info!("Boundary line at y={}", self.boundary_y);
        }
        self.frame_dims = Some((width, height));
    }

    /// The shared once-per-interval gate: when due, collapse the smoother
    /// buckets, then flush the batch. Returns events flushed (0 if not due).
    fn run_flush_gate(&mut self, now: DateTime<Local>, sink: &mut dyn EventSink) -> usize {
        let last = match self.last_flush {
            Some(last) => last,
            None => {
                self.last_flush = Some(now);
                return 0;
            }
        };
        let interval =
            Duration::milliseconds((self.config.batching.flush_interval_secs * 1000.0) as i64);
        if now.signed_duration_since(last) < interval {
            return 0;
        }

        self.smoother.tick();
        self.last_flush = Some(now);
        self.settle_flush(sink)
    }

    fn settle_flush(&mut self, sink: &mut dyn EventSink) -> usize {
        match self.batcher.flush(sink) {
            Ok(0) => 0,
            Ok(flushed) => {
                self.metrics.inc(&self.metrics.batches_flushed);
                self.metrics.add(&self.metrics.events_flushed, flushed as u64);
                flushed
            }
            Err(_) => {
                // Already logged by the batcher; the buffer is retained and
                // the next due flush retries
                self.metrics.inc(&self.metrics.flush_failures);
                0
            }
        }
    }
}
