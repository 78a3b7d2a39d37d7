// src/sink.rs
//
// The persistence seam. The analytics core hands finished event batches to
// whatever backend the embedding pipeline wires in (cloud database, message
// queue, file). Two reference implementations live here; real backends
// implement the trait in the embedder.

use crate::error::SinkError;
use crate::types::AnalyticsEvent;
use std::io::Write;

/// Append-only batch persistence for analytics events.
///
/// A flush hands the whole pending batch in a single call. Implementations
/// are never called with an empty batch.
pub trait EventSink {
    fn append_batch(&mut self, events: &[AnalyticsEvent]) -> Result<(), SinkError>;
}

/// Collects batches in memory. Reference implementation and test double.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Vec<Vec<AnalyticsEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch received, in flush order
    pub fn batches(&self) -> &[Vec<AnalyticsEvent>] {
        &self.batches
    }

    /// All events across all batches, in arrival order
    pub fn events(&self) -> Vec<&AnalyticsEvent> {
        self.batches.iter().flatten().collect()
    }
}

impl EventSink for MemorySink {
    fn append_batch(&mut self, events: &[AnalyticsEvent]) -> Result<(), SinkError> {
        self.batches.push(events.to_vec());
        Ok(())
    }
}

/// Serializes each event as one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn append_batch(&mut self, events: &[AnalyticsEvent]) -> Result<(), SinkError> {
        for event in events {
            serde_json::to_writer(&mut self.writer, event)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
