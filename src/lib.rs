// src/lib.rs
//
// Stateful per-track traffic analytics over an externally supplied stream of
// detections + track identities. The embedding pipeline owns frame I/O, the
// detector/tracker pair, and durable persistence; this crate owns everything
// in between: position history, calibrated speed, per-second median smoothing,
// one-shot boundary crossing counts, and the buffered event log.

pub mod analysis;
mod config;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod types;

pub use error::SinkError;
pub use pipeline::{AnalyticsPipeline, EventBatcher};
pub use sink::{EventSink, JsonLinesSink, MemorySink};
pub use types::{
    AnalyticsEvent, Config, CrossingLabel, CrossingState, FrameInput, FrameReport,
    TrackedDetection,
};
