use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analytics: AnalyticsConfig,
    pub boundary: BoundaryConfig,
    pub batching: BatchingConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Scales the assumed pixel-per-meter ratio for the camera/scene geometry
    pub calibration_factor: f64,
    /// Per-frame speed samples kept per track (oldest evicted)
    pub speed_window_length: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            calibration_factor: 1.0,
            speed_window_length: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Vertical offset of the counting line below mid-frame, in pixels
    pub offset_px: i32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self { offset_px: 175 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchingConfig {
    /// Cadence of the shared smoother-tick + batch-flush gate
    pub flush_interval_secs: f64,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            flush_interval_secs: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Frames a track survives unseen before its history entry is evicted
    pub track_ttl_frames: u64,
    /// Class IDs treated as vehicles (COCO: 2=car, 3=motorcycle, 5=bus, 7=truck).
    /// Empty list disables filtering.
    pub vehicle_class_ids: Vec<u32>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            track_ttl_frames: 900,
            vehicle_class_ids: vec![2, 3, 5, 7],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// One tracked detection from the external detector+tracker pair.
#[derive(Debug, Clone)]
pub struct TrackedDetection {
    /// [x1, y1, x2, y2] pixels
    pub bbox: [f32; 4],
    pub track_id: u64,
    pub class_id: u32,
    /// Carried through from the detector; unused by the analytics core
    pub confidence: f32,
}

impl TrackedDetection {
    pub fn new(bbox: [f32; 4], track_id: u64, class_id: u32, confidence: f32) -> Self {
        Self {
            bbox,
            track_id,
            class_id,
            confidence,
        }
    }

    /// Integer-pixel box center, the track's position proxy
    pub fn centroid(&self) -> (i32, i32) {
        (
            ((self.bbox[0] + self.bbox[2]) * 0.5) as i32,
            ((self.bbox[1] + self.bbox[3]) * 0.5) as i32,
        )
    }
}

/// Everything the pipeline needs to process one frame. The wall clock drives
/// both the flush gate and event timestamps, so tests can replay a stream
/// with a synthetic clock.
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub frame_id: u64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub wall_clock: DateTime<Local>,
    pub detections: Vec<TrackedDetection>,
}

impl FrameInput {
    pub fn new(
        frame_id: u64,
        frame_width: u32,
        frame_height: u32,
        wall_clock: DateTime<Local>,
        detections: Vec<TrackedDetection>,
    ) -> Self {
        Self {
            frame_id,
            frame_width,
            frame_height,
            wall_clock,
            detections,
        }
    }
}

/// Counting state of a track relative to the boundary line. A track never
/// reverts to Uncounted; the state only moves between Entered and Exited,
/// which is what prevents repeat counts in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingState {
    Uncounted,
    Entered,
    Exited,
}

/// Per-frame classification of a track's motion against the boundary line.
/// Unknown means "no crossing this frame", not missing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossingLabel {
    Entered,
    Exited,
    Unknown,
}

impl CrossingLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entered => "entered",
            Self::Exited => "exited",
            Self::Unknown => "unknown",
        }
    }
}

/// One finalized analytics record, the unit handed to external persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub object_class: String,
    pub track_id: u64,
    pub median_speed: f64,
    /// "%Y-%m-%d %H:%M:%S", local time
    pub timestamp: String,
    pub crossing_label: CrossingLabel,
}

/// Per-track overlay data for the frame just processed. Rendering is the
/// embedder's job; this is the data it draws from.
#[derive(Debug, Clone)]
pub struct TrackAnnotation {
    pub track_id: u64,
    pub object_class: &'static str,
    pub bbox: [f32; 4],
    /// Current representative (per-second median) speed, km/h
    pub display_speed: f64,
    pub crossing_label: CrossingLabel,
}

/// Result of processing one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub frame_id: u64,
    pub boundary_y: i32,
    pub annotations: Vec<TrackAnnotation>,
    pub vehicles_entering: u64,
    pub vehicles_exiting: u64,
    /// Events handed to the sink during this frame's flush gate (0 if not due)
    pub events_flushed: usize,
}

/// COCO names for the vehicle classes the pipeline tracks.
pub fn class_name(class_id: u32) -> &'static str {
    match class_id {
        2 => "car",
        3 => "motorcycle",
        5 => "bus",
        7 => "truck",
        _ => "unknown",
    }
}
