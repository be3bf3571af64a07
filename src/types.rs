use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub zone: ZoneConfig,
    pub estimator: EstimatorConfig,
    pub replay: ReplayConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Zone vertices in pixel coordinates, in drawing order.
/// Exactly four are required before tracking starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub vertices: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Real-world reference height in meters (an average person).
    pub real_height_m: f32,
    /// Apparent pixel height of the reference at a known distance.
    pub pixel_height_ref: f32,
    /// Frame rate used to convert frame deltas into seconds.
    pub fps: f64,
    /// Recompute speed every N-th frame; the last value is retained in between.
    pub speed_interval: u64,
    /// Capacity of the per-track (frame, distance) sample window.
    pub history_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub detections_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub show_alerts: bool,
    pub statistics_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// One tracked-object detection as reported by the external detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Tracker-assigned id. `None` means the detector could not associate
    /// this box with a track; such boxes are classified but never enter the
    /// occupancy lifecycle.
    #[serde(default)]
    pub track_id: Option<u64>,
    /// [x1, y1, x2, y2] in pixel coordinates.
    pub bbox: [f32; 4],
}

/// Lifecycle event emitted by the zone manager. Each variant carries exactly
/// the fields that event kind has.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ZoneEvent {
    Entry {
        track_id: u64,
        timestamp: f64,
    },
    Exit {
        track_id: u64,
        timestamp: f64,
        duration: f64,
        total_distance: f32,
    },
}

/// Immutable summary of one completed zone visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub track_id: u64,
    pub entry_time: f64,
    pub exit_time: f64,
    pub duration: f64,
    pub total_distance: f32,
    pub last_speed: Option<f32>,
}

/// Aggregate view over the violation history. All numeric fields are 0 when
/// the history is empty.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_violations: usize,
    pub distinct_tracks: usize,
    pub average_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub violations: Vec<ViolationRecord>,
}

/// Per-detection presentation data for an external renderer. `in_zone`
/// selects the color class; `label` is the joined display string.
#[derive(Debug, Clone)]
pub struct DetectionView {
    pub track_id: Option<u64>,
    pub in_zone: bool,
    pub label: String,
}

/// Everything the zone manager produced for one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub frame_index: u64,
    pub events: Vec<ZoneEvent>,
    pub detections: Vec<DetectionView>,
    pub in_zone_count: usize,
}
