//! Zone occupancy tracking over per-frame object detection streams.
//!
//! The core is [`zone_manager::ZoneManager`]: feed it one frame of tracked
//! detections at a time and it maintains per-object entry/dwell/exit
//! lifecycles inside a user-defined quadrilateral zone, estimates distance
//! and radial speed from bounding-box geometry, and aggregates completed
//! visits into violation records.
//!
//! ```rust,ignore
//! use zone_alert::types::{Detection, EstimatorConfig};
//! use zone_alert::zone::ZonePolygon;
//! use zone_alert::zone_manager::ZoneManager;
//!
//! let zone = ZonePolygon::from_vertices(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
//! let mut manager = ZoneManager::new(zone, &EstimatorConfig::default());
//! let frame = manager.update(&[Detection { track_id: Some(1), bbox: [2.0, 2.0, 6.0, 8.0] }], 0.0);
//! let stats = manager.statistics();
//! ```

pub mod config;
pub mod distance;
pub mod replay;
pub mod report;
pub mod speed;
pub mod track;
pub mod types;
pub mod zone;
pub mod zone_manager;
