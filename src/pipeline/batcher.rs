// src/pipeline/batcher.rs
//
// Accumulates finalized analytics events between flushes. Growth between
// flushes is unbounded in principle but bounded in practice by the
// once-per-second gate. The buffer clears only after a successful handoff,
// so a failed flush loses nothing and the next due flush retries the lot.

use crate::error::SinkError;
use crate::sink::EventSink;
use crate::types::AnalyticsEvent;
use tracing::{debug, info, warn};

#[derive(Default)]
pub struct EventBatcher {
    pending: Vec<AnalyticsEvent>,
}

impl EventBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: AnalyticsEvent) {
        debug!(
            "Buffered event: track {} {} at {:.1} km/h",
            event.track_id,
            event.crossing_label.as_str(),
            event.median_speed
        );
        self.pending.push(event);
    }

    /// Hand the whole pending batch to the sink in one call. An empty batch
    /// skips the sink entirely. Returns how many events were flushed.
    pub fn flush(&mut self, sink: &mut dyn EventSink) -> Result<usize, SinkError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        match sink.append_batch(&self.pending) {
            Ok(()) => {
                let flushed = self.pending.len();
                info!("Flushed batch of {} events", flushed);
                self.pending.clear();
                Ok(flushed)
            }
            Err(err) => {
                warn!(
                    "Batch flush failed, retaining {} events: {}",
                    self.pending.len(),
                    err
                );
                Err(err)
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::types::CrossingLabel;

    fn event(track_id: u64) -> AnalyticsEvent {
        AnalyticsEvent {
            object_class: "car".to_string(),
            track_id,
            median_speed: 40.0,
            timestamp: "2024-05-01 12:00:00".to_string(),
            crossing_label: CrossingLabel::Unknown,
        }
    }

    struct FailingSink;

    impl EventSink for FailingSink {
        fn append_batch(&mut self, _events: &[AnalyticsEvent]) -> Result<(), SinkError> {
            Err(SinkError::Backend("connection refused".to_string()))
        }
    }

    #[test]
    fn test_flush_hands_whole_batch_and_clears() {
        let mut batcher = EventBatcher::new();
        let mut sink = MemorySink::new();
        batcher.append(event(1));
        batcher.append(event(2));
        batcher.append(event(3));

        let flushed = batcher.flush(&mut sink).unwrap();
        assert_eq!(flushed, 3);
        assert_eq!(batcher.pending_count(), 0);
        assert_eq!(sink.batches().len(), 1, "one batch, one sink call");
        assert_eq!(sink.batches()[0].len(), 3);
    }

    #[test]
    fn test_empty_batch_never_calls_sink() {
        let mut batcher = EventBatcher::new();
        let mut sink = MemorySink::new();
        assert_eq!(batcher.flush(&mut sink).unwrap(), 0);
        assert!(sink.batches().is_empty());
    }

    #[test]
    fn test_failed_flush_retains_events() {
        let mut batcher = EventBatcher::new();
        batcher.append(event(1));
        batcher.append(event(2));

        assert!(batcher.flush(&mut FailingSink).is_err());
        assert_eq!(batcher.pending_count(), 2, "nothing lost on failure");

        // Next flush against a working sink delivers the retained events
        let mut sink = MemorySink::new();
        assert_eq!(batcher.flush(&mut sink).unwrap(), 2);
        assert_eq!(sink.batches()[0].len(), 2);
    }
}
