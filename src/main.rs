// src/main.rs

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use zone_alert::replay::ReplaySource;
use zone_alert::report;
use zone_alert::types::Config;
use zone_alert::zone::{ZonePolygon, ZONE_VERTEX_COUNT};
use zone_alert::zone_manager::ZoneManager;

#[derive(Parser, Debug)]
#[command(
    name = "zone-alert",
    about = "Danger-zone occupancy tracking over recorded detection streams"
)]
struct Args {
    /// Path to the YAML configuration
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    /// Detections file (JSON lines), overriding the configured path
    #[arg(long)]
    detections: Option<PathBuf>,
    /// Statistics output file, overriding the configured path
    #[arg(long)]
    statistics: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("zone_alert={}", config.logging.level))
        .init();

    info!("🚨 Danger Zone Alert System starting");
    info!("✓ Configuration loaded from {}", args.config.display());

    // The zone is a construction-time precondition, not a per-frame failure:
    // refuse to start without exactly four vertices.
    if config.zone.vertices.len() != ZONE_VERTEX_COUNT {
        bail!(
            "Zone must have exactly {} vertices, found {}; configure the zone before tracking",
            ZONE_VERTEX_COUNT,
            config.zone.vertices.len()
        );
    }
    let zone = ZonePolygon::from_vertices(
        config.zone.vertices.iter().map(|v| (v[0], v[1])).collect(),
    );
    info!("Zone vertices: {:?}", zone.vertices());
    info!(
        "Calibration: {:.2}m @ {:.0}px, {} fps, speed every {} frames, window {}",
        config.estimator.real_height_m,
        config.estimator.pixel_height_ref,
        config.estimator.fps,
        config.estimator.speed_interval,
        config.estimator.history_window
    );

    let mut manager = ZoneManager::new(zone, &config.estimator);

    let detections_path = args
        .detections
        .unwrap_or_else(|| PathBuf::from(&config.replay.detections_path));
    let source = ReplaySource::open(&detections_path)?;

    let mut frame_count = 0u64;
    let mut last_timestamp = 0.0f64;

    for record in source {
        let record = record?;
        let timestamp = record
            .timestamp
            .unwrap_or(frame_count as f64 / config.estimator.fps);
        last_timestamp = timestamp;
        frame_count += 1;

        let frame = manager.update(&record.detections, timestamp);

        if config.report.show_alerts {
            for event in &frame.events {
                report::log_event(event);
            }
        }

        if frame_count % 30 == 0 {
            info!(
                "Processed {} frames, {} track(s) in zone",
                frame_count, frame.in_zone_count
            );
        }
    }

    // Stream ended: whoever is still in the zone gets closed out now.
    for event in manager.finalize(last_timestamp) {
        if config.report.show_alerts {
            report::log_event(&event);
        }
    }

    let stats = manager.statistics();
    report::print_statistics(&stats);
    info!("Total frames processed: {}", frame_count);

    let statistics_path = args
        .statistics
        .or_else(|| config.report.statistics_path.as_ref().map(PathBuf::from));
    if let Some(path) = statistics_path {
        report::save_statistics(&stats, &path)?;
        info!("✓ Statistics saved to {}", path.display());
    }

    info!("Danger Zone Alert System stopped");
    Ok(())
}
