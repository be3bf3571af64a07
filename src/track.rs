// src/track.rs
//
// Per-object occupancy record. Lives in the zone manager's active map from
// the first in-zone observation until the disappearance-implied exit (or
// stream-end finalize) converts it into a ViolationRecord.

use crate::speed::DistanceHistory;
use crate::types::ViolationRecord;

#[derive(Debug, Clone)]
pub struct TrackState {
    pub track_id: u64,
    /// Wall-clock seconds at creation. Set once.
    pub entry_time: f64,
    /// Set exactly once, on exit or at stream end.
    pub exit_time: Option<f64>,
    /// Whether the most recent observation of this id was inside the zone.
    /// Disappearance only counts as an exit while this is set.
    pub in_zone: bool,
    pub last_distance: Option<f32>,
    /// Persists across frames where recomputation is skipped or comes back
    /// undetermined.
    pub last_speed: Option<f32>,
    /// Path length in depth: sum of |delta| between consecutive distance
    /// measurements, not net displacement.
    pub total_distance: f32,
    pub history: DistanceHistory,
}

impl TrackState {
    pub fn new(track_id: u64, entry_time: f64, history_window: usize) -> Self {
        Self {
            track_id,
            entry_time,
            exit_time: None,
            in_zone: true,
            last_distance: None,
            last_speed: None,
            total_distance: 0.0,
            history: DistanceHistory::new(history_window),
        }
    }

    /// Record a fresh distance measurement, accumulating the absolute step
    /// from the previous one.
    pub fn record_distance(&mut self, distance: f32) {
        if let Some(previous) = self.last_distance {
            self.total_distance += (distance - previous).abs();
        }
        self.last_distance = Some(distance);
    }

    /// Seconds spent in the zone so far, or the final dwell time once the
    /// exit is marked.
    pub fn duration(&self, current_time: f64) -> f64 {
        match self.exit_time {
            Some(exit) => exit - self.entry_time,
            None => current_time - self.entry_time,
        }
    }

    /// Terminal transition: fix the exit time (first caller wins) and
    /// convert into an immutable violation record.
    pub fn close(mut self, exit_time: f64) -> ViolationRecord {
        let exit = *self.exit_time.get_or_insert(exit_time);
        ViolationRecord {
            track_id: self.track_id,
            entry_time: self.entry_time,
            exit_time: exit,
            duration: exit - self.entry_time,
            total_distance: self.total_distance,
            last_speed: self.last_speed,
        }
    }
}
