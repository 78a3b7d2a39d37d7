// src/pipeline/mod.rs

pub mod batcher;
pub mod metrics;
pub mod orchestrator;

pub use batcher::EventBatcher;
pub use metrics::{AnalyticsMetrics, MetricsSummary};
pub use orchestrator::AnalyticsPipeline;
