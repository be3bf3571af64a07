// src/zone_manager.rs
//
// Per-frame orchestration of zone occupancy: containment tests, estimator
// updates, track lifecycle transitions, event emission, and the violation
// history. Exclusively owns all mutable tracking state; the caller drives
// it one frame at a time and supplies the wall-clock timestamp.

use crate::distance::DistanceEstimator;
use crate::speed::SpeedEstimator;
use crate::track::TrackState;
use crate::types::{
    Detection, DetectionView, EstimatorConfig, FrameReport, Statistics, ViolationRecord, ZoneEvent,
};
use crate::zone::ZonePolygon;
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub struct ZoneManager {
    zone: ZonePolygon,
    distance: DistanceEstimator,
    speed: SpeedEstimator,
    speed_interval: u64,
    history_window: usize,
    active: HashMap<u64, TrackState>,
    history: Vec<ViolationRecord>,
    frame_index: u64,
}

impl ZoneManager {
    /// The zone must be assigned its vertices before the first frame;
    /// an incomplete zone is fail-safe (contains nothing) but the shell
    /// validates the vertex count up front.
    pub fn new(zone: ZonePolygon, config: &EstimatorConfig) -> Self {
        Self {
            zone,
            distance: DistanceEstimator::from_config(config),
            speed: SpeedEstimator::new(config.fps),
            speed_interval: config.speed_interval.max(1),
            history_window: config.history_window,
            active: HashMap::new(),
            history: Vec::new(),
            frame_index: 0,
        }
    }

    pub fn zone(&self) -> &ZonePolygon {
        &self.zone
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn track(&self, track_id: u64) -> Option<&TrackState> {
        self.active.get(&track_id)
    }

    /// Process one frame of detections.
    pub fn update(&mut self, detections: &[Detection], frame_timestamp: f64) -> FrameReport {
        // 1. Advance the frame counter.
        self.frame_index += 1;
        let frame_index = self.frame_index;

        let mut events = Vec::new();
        let mut views = Vec::with_capacity(detections.len());
        let mut seen_ids = HashSet::new();

        // 2. Classify every detection and update or create track state.
        for detection in detections {
            if let Some(id) = detection.track_id {
                seen_ids.insert(id);
            }

            let in_zone = self.zone.contains_bbox(&detection.bbox);
            let mut distance = None;
            let mut speed = None;

            if in_zone {
                // Distance is only estimated for in-zone detections.
                distance = self.distance.estimate(&detection.bbox);

                if let Some(id) = detection.track_id {
                    let window = self.history_window;
                    let state = self.active.entry(id).or_insert_with(|| {
                        debug!("Track {} entered the zone", id);
                        events.push(ZoneEvent::Entry {
                            track_id: id,
                            timestamp: frame_timestamp,
                        });
                        TrackState::new(id, frame_timestamp, window)
                    });
                    state.in_zone = true;

                    if let Some(d) = distance {
                        state.record_distance(d);

                        // Speed recomputation is sampled every N-th frame to
                        // keep the finite differences out of pixel noise; in
                        // between, the last value stands.
                        if frame_index % self.speed_interval == 0 {
                            state.history.push(frame_index, d);
                            if let Some(s) = self.speed.average_speed(&state.history) {
                                state.last_speed = Some(s);
                            }
                        }
                    }
                    speed = state.last_speed;
                }
            } else if let Some(id) = detection.track_id {
                // Observed outside the zone: flag it, but an exit is only
                // triggered by disappearance, never by this observation.
                if let Some(state) = self.active.get_mut(&id) {
                    state.in_zone = false;
                    speed = state.last_speed;
                }
            }

            views.push(DetectionView {
                track_id: detection.track_id,
                in_zone,
                label: build_label(detection.track_id, in_zone, distance, speed),
            });
        }

        // 3. Disappearance-implied exits: ids flagged in-zone on their last
        //    observation that the detector no longer reports.
        let mut exited: Vec<u64> = self
            .active
            .iter()
            .filter(|(id, state)| state.in_zone && !seen_ids.contains(*id))
            .map(|(id, _)| *id)
            .collect();
        exited.sort_unstable();

        for id in exited {
            if let Some(state) = self.active.remove(&id) {
                let record = state.close(frame_timestamp);
                debug!(
                    "Track {} left the zone after {:.2}s",
                    id, record.duration
                );
                events.push(ZoneEvent::Exit {
                    track_id: id,
                    timestamp: frame_timestamp,
                    duration: record.duration,
                    total_distance: record.total_distance,
                });
                self.history.push(record);
            }
        }

        let in_zone_count = self.active.values().filter(|s| s.in_zone).count();

        FrameReport {
            frame_index,
            events,
            detections: views,
            in_zone_count,
        }
    }

    /// Flush every still-active track into the history at the given
    /// timestamp. Safe to call again: a drained map yields nothing.
    pub fn finalize(&mut self, timestamp: f64) -> Vec<ZoneEvent> {
        let mut ids: Vec<u64> = self.active.keys().copied().collect();
        ids.sort_unstable();

        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(state) = self.active.remove(&id) {
                let record = state.close(timestamp);
                debug!(
                    "Track {} still active at stream end, closed after {:.2}s",
                    id, record.duration
                );
                events.push(ZoneEvent::Exit {
                    track_id: id,
                    timestamp,
                    duration: record.duration,
                    total_distance: record.total_distance,
                });
                self.history.push(record);
            }
        }
        events
    }

    /// Read-only aggregate over the violation history.
    pub fn statistics(&self) -> Statistics {
        let total_violations = self.history.len();
        let distinct_tracks = self
            .history
            .iter()
            .map(|r| r.track_id)
            .collect::<HashSet<_>>()
            .len();

        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for record in &self.history {
            sum += record.duration;
            min = min.min(record.duration);
            max = max.max(record.duration);
        }

        let average_duration = if total_violations > 0 {
            sum / total_violations as f64
        } else {
            0.0
        };

        Statistics {
            total_violations,
            distinct_tracks,
            average_duration,
            min_duration: if total_violations > 0 { min } else { 0.0 },
            max_duration: if total_violations > 0 { max } else { 0.0 },
            violations: self.history.clone(),
        }
    }

    /// Back to the initial empty state: no active tracks, no history, frame
    /// counter at zero. The zone and estimator configuration stay.
    pub fn reset(&mut self) {
        self.active.clear();
        self.history.clear();
        self.frame_index = 0;
    }
}

/// Ordered label fragments for the renderer: track id, then distance (only
/// when in zone and determined), then unsigned speed (only when determined).
fn build_label(
    track_id: Option<u64>,
    in_zone: bool,
    distance: Option<f32>,
    speed: Option<f32>,
) -> String {
    let mut fragments = Vec::new();
    if let Some(id) = track_id {
        fragments.push(format!("ID {}", id));
    }
    if in_zone {
        if let Some(d) = distance {
            fragments.push(format!("{:.2}m", d));
        }
    }
    if let Some(s) = speed {
        fragments.push(format!("{:.2}m/s", s.abs()));
    }
    fragments.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_zone() -> ZonePolygon {
        ZonePolygon::from_vertices(vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)])
    }

    fn test_config() -> EstimatorConfig {
        // Calibration product of 100 keeps distances easy to read:
        // a 20 px tall box sits at 5 m.
        EstimatorConfig {
            real_height_m: 1.0,
            pixel_height_ref: 100.0,
            fps: 30.0,
            speed_interval: 5,
            history_window: 8,
        }
    }

    fn manager() -> ZoneManager {
        ZoneManager::new(square_zone(), &test_config())
    }

    fn det(track_id: u64, bbox: [f32; 4]) -> Detection {
        Detection {
            track_id: Some(track_id),
            bbox,
        }
    }

    /// Box whose bottom center lands at (50, 50), 40 px tall.
    fn in_zone_bbox() -> [f32; 4] {
        [40.0, 10.0, 60.0, 50.0]
    }

    /// Bottom center at (150, 150), outside the square.
    fn out_of_zone_bbox() -> [f32; 4] {
        [140.0, 110.0, 160.0, 150.0]
    }

    // ---- Lifecycle ----

    #[test]
    fn test_entry_then_disappearance_exit() {
        let mut mgr = manager();

        let report = mgr.update(&[det(1, in_zone_bbox())], 10.0);
        assert_eq!(
            report.events,
            vec![ZoneEvent::Entry {
                track_id: 1,
                timestamp: 10.0
            }]
        );
        assert_eq!(report.in_zone_count, 1);

        // Dwelling produces no further events.
        let report = mgr.update(&[det(1, in_zone_bbox())], 10.1);
        assert!(report.events.is_empty());
        let report = mgr.update(&[det(1, in_zone_bbox())], 10.2);
        assert!(report.events.is_empty());

        // The id vanishes from the detector output.
        let report = mgr.update(&[], 10.3);
        match report.events.as_slice() {
            [ZoneEvent::Exit {
                track_id,
                timestamp,
                duration,
                ..
            }] => {
                assert_eq!(*track_id, 1);
                assert_eq!(*timestamp, 10.3);
                assert!((duration - 0.3).abs() < 1e-9);
            }
            other => panic!("expected a single exit event, got {:?}", other),
        }
        assert_eq!(mgr.active_count(), 0);
        assert_eq!(mgr.statistics().total_violations, 1);
    }

    #[test]
    fn test_reentry_creates_independent_record() {
        let mut mgr = manager();

        mgr.update(&[det(1, in_zone_bbox())], 10.0);
        mgr.update(&[], 11.0);
        assert_eq!(mgr.statistics().total_violations, 1);

        // Same id comes back: brand-new visit, second record.
        let report = mgr.update(&[det(1, in_zone_bbox())], 20.0);
        assert_eq!(
            report.events,
            vec![ZoneEvent::Entry {
                track_id: 1,
                timestamp: 20.0
            }]
        );
        mgr.update(&[], 22.0);

        let stats = mgr.statistics();
        assert_eq!(stats.total_violations, 2);
        assert_eq!(stats.distinct_tracks, 1);
        assert!((stats.violations[0].duration - 1.0).abs() < 1e-9);
        assert!((stats.violations[1].duration - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_moved_out_but_still_tracked_never_exits() {
        let mut mgr = manager();

        mgr.update(&[det(1, in_zone_bbox())], 10.0);

        // Steps out of the polygon but the tracker still reports it:
        // no exit event, by design.
        let report = mgr.update(&[det(1, out_of_zone_bbox())], 10.1);
        assert!(report.events.is_empty());
        assert_eq!(report.in_zone_count, 0);

        // Now it disappears entirely while flagged out-of-zone: still no
        // exit; the record stays active until finalize.
        let report = mgr.update(&[], 10.2);
        assert!(report.events.is_empty());
        assert_eq!(mgr.active_count(), 1);
        assert_eq!(mgr.statistics().total_violations, 0);

        let events = mgr.finalize(11.0);
        assert_eq!(events.len(), 1);
        assert_eq!(mgr.statistics().total_violations, 1);
    }

    #[test]
    fn test_disappeared_while_in_zone_exits() {
        let mut mgr = manager();
        mgr.update(&[det(1, in_zone_bbox())], 10.0);
        let report = mgr.update(&[], 10.1);
        assert_eq!(report.events.len(), 1);
        assert!(matches!(report.events[0], ZoneEvent::Exit { .. }));
    }

    #[test]
    fn test_entry_and_exit_in_same_frame_are_ordered() {
        let mut mgr = manager();
        mgr.update(&[det(1, in_zone_bbox())], 10.0);

        // Track 1 vanishes on the same frame track 2 appears.
        let report = mgr.update(&[det(2, in_zone_bbox())], 10.5);
        assert_eq!(report.events.len(), 2);
        assert!(matches!(
            report.events[0],
            ZoneEvent::Entry { track_id: 2, .. }
        ));
        assert!(matches!(
            report.events[1],
            ZoneEvent::Exit { track_id: 1, .. }
        ));
    }

    #[test]
    fn test_untracked_detection_is_classified_only() {
        let mut mgr = manager();
        let report = mgr.update(
            &[Detection {
                track_id: None,
                bbox: in_zone_bbox(),
            }],
            10.0,
        );
        assert!(report.events.is_empty());
        assert_eq!(mgr.active_count(), 0);
        let view = &report.detections[0];
        assert!(view.in_zone);
        assert!(view.track_id.is_none());
        // No id fragment, but the distance still shows.
        assert!(view.label.contains('m'));
        assert!(!view.label.contains("ID"));
    }

    #[test]
    fn test_incomplete_zone_contains_no_detection() {
        let mut mgr = ZoneManager::new(ZonePolygon::new(), &test_config());
        let report = mgr.update(&[det(1, in_zone_bbox())], 10.0);
        assert!(report.events.is_empty());
        assert!(!report.detections[0].in_zone);
        assert_eq!(mgr.active_count(), 0);
    }

    // ---- Estimators through the manager ----

    #[test]
    fn test_degenerate_bbox_in_zone_has_no_distance() {
        let mut mgr = manager();
        // Zero-height box whose bottom center is still inside the zone.
        let report = mgr.update(&[det(1, [40.0, 50.0, 60.0, 50.0])], 10.0);
        assert_eq!(report.events.len(), 1); // entry still fires
        let state = mgr.track(1).unwrap();
        assert!(state.last_distance.is_none());
        assert_eq!(state.total_distance, 0.0);
        assert_eq!(report.detections[0].label, "ID 1");
    }

    #[test]
    fn test_total_distance_accumulates_per_frame() {
        let mut mgr = manager();
        // Heights chosen so the calibration product of 100 yields the
        // distance sequence 5.0, 4.5, 4.0, 4.2.
        for (i, d) in [5.0f32, 4.5, 4.0, 4.2].iter().enumerate() {
            let height = 100.0 / d;
            let bbox = [40.0, 50.0 - height, 60.0, 50.0];
            mgr.update(&[det(1, bbox)], 10.0 + i as f64 * 0.1);
        }
        let state = mgr.track(1).unwrap();
        assert!((state.total_distance - 1.2).abs() < 1e-3);
    }

    #[test]
    fn test_speed_determined_at_second_sampled_frame() {
        let mut mgr = manager();
        // speed_interval = 5: the window samples at frames 5 and 10.
        for i in 0..9 {
            mgr.update(&[det(1, in_zone_bbox())], 10.0 + i as f64 / 30.0);
            assert!(mgr.track(1).unwrap().last_speed.is_none());
        }
        mgr.update(&[det(1, in_zone_bbox())], 10.3);
        assert!(mgr.track(1).unwrap().last_speed.is_some());
    }

    #[test]
    fn test_last_speed_retained_on_skipped_frames() {
        let mut mgr = manager();
        for i in 0..10 {
            mgr.update(&[det(1, in_zone_bbox())], 10.0 + i as f64 / 30.0);
        }
        let computed = mgr.track(1).unwrap().last_speed;
        assert!(computed.is_some());
        // Frames 11..14 skip recomputation; the value must not reset.
        for i in 10..14 {
            mgr.update(&[det(1, in_zone_bbox())], 10.0 + i as f64 / 30.0);
            assert_eq!(mgr.track(1).unwrap().last_speed, computed);
        }
    }

    #[test]
    fn test_history_never_exceeds_window() {
        let mut config = test_config();
        config.speed_interval = 1; // sample every frame
        let mut mgr = ZoneManager::new(square_zone(), &config);
        for i in 0..100u64 {
            mgr.update(&[det(1, in_zone_bbox())], 10.0 + i as f64 / 30.0);
            let len = mgr.track(1).unwrap().history.len();
            assert_eq!(len, ((i + 1) as usize).min(config.history_window));
        }
    }

    // ---- Finalize / statistics / reset ----

    #[test]
    fn test_finalize_flushes_all_active_and_is_idempotent() {
        let mut mgr = manager();
        mgr.update(
            &[det(1, in_zone_bbox()), det(2, in_zone_bbox())],
            10.0,
        );

        let events = mgr.finalize(42.0);
        assert_eq!(events.len(), 2);
        let stats = mgr.statistics();
        assert_eq!(stats.total_violations, 2);
        for record in &stats.violations {
            assert_eq!(record.exit_time, 42.0);
        }

        // Second call: nothing left to flush.
        assert!(mgr.finalize(43.0).is_empty());
        assert_eq!(mgr.statistics().total_violations, 2);
    }

    #[test]
    fn test_statistics_aggregates() {
        let mut mgr = manager();
        mgr.update(&[det(1, in_zone_bbox())], 10.0);
        mgr.update(&[det(1, in_zone_bbox()), det(2, in_zone_bbox())], 11.0);
        mgr.update(&[], 13.0); // track 1: 3s, track 2: 2s

        let stats = mgr.statistics();
        assert_eq!(stats.total_violations, 2);
        assert_eq!(stats.distinct_tracks, 2);
        assert!((stats.min_duration - 2.0).abs() < 1e-9);
        assert!((stats.max_duration - 3.0).abs() < 1e-9);
        assert!((stats.average_duration - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_statistics_are_zero() {
        let stats = manager().statistics();
        assert_eq!(stats.total_violations, 0);
        assert_eq!(stats.distinct_tracks, 0);
        assert_eq!(stats.average_duration, 0.0);
        assert_eq!(stats.min_duration, 0.0);
        assert_eq!(stats.max_duration, 0.0);
        assert!(stats.violations.is_empty());
    }

    #[test]
    fn test_reset_returns_to_initial_state() {
        let mut mgr = manager();
        mgr.update(&[det(1, in_zone_bbox())], 10.0);
        mgr.update(&[], 11.0);
        mgr.update(&[det(2, in_zone_bbox())], 12.0);
        assert!(mgr.frame_index() > 0);

        mgr.reset();
        assert_eq!(mgr.statistics().total_violations, 0);
        assert_eq!(mgr.active_count(), 0);
        assert_eq!(mgr.frame_index(), 0);
    }

    // ---- Labels ----

    #[test]
    fn test_in_zone_label_has_id_and_distance() {
        let mut mgr = manager();
        let report = mgr.update(&[det(3, in_zone_bbox())], 10.0);
        // 40 px tall with calibration 100 -> 2.50 m
        assert_eq!(report.detections[0].label, "ID 3 2.50m");
    }

    #[test]
    fn test_out_of_zone_label_is_id_only() {
        let mut mgr = manager();
        let report = mgr.update(&[det(3, out_of_zone_bbox())], 10.0);
        assert!(!report.detections[0].in_zone);
        assert_eq!(report.detections[0].label, "ID 3");
    }

    #[test]
    fn test_label_speed_is_unsigned() {
        assert_eq!(
            build_label(Some(4), true, Some(3.0), Some(-1.5)),
            "ID 4 3.00m 1.50m/s"
        );
    }
}
