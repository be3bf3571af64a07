// src/report.rs
//
// Console alerting and statistics persistence. Everything here consumes the
// structures the zone manager returns; nothing feeds back into tracking.

use crate::types::{Statistics, ZoneEvent};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub fn log_event(event: &ZoneEvent) {
    match event {
        ZoneEvent::Entry {
            track_id,
            timestamp,
        } => {
            warn!(
                "🚨 ALERT! Track {} entered the danger zone at {}",
                track_id,
                format_clock(*timestamp)
            );
        }
        ZoneEvent::Exit {
            track_id,
            timestamp,
            duration,
            total_distance,
        } => {
            info!(
                "⚠ Track {} left the danger zone at {} (dwell {:.2}s, depth path {:.2}m)",
                track_id,
                format_clock(*timestamp),
                duration,
                total_distance
            );
        }
    }
}

pub fn print_statistics(stats: &Statistics) {
    if stats.violations.is_empty() {
        info!("No danger zone violations detected");
        return;
    }

    info!("================================================================");
    info!("DANGER ZONE VIOLATIONS");
    info!("================================================================");

    for (i, violation) in stats.violations.iter().enumerate() {
        info!(
            "Violation #{}: track {} | entry {} | exit {} | dwell {}",
            i + 1,
            violation.track_id,
            format_clock(violation.entry_time),
            format_clock(violation.exit_time),
            format_duration(violation.duration)
        );
        if let Some(speed) = violation.last_speed {
            info!(
                "    last speed {:.2} m/s, depth path {:.2} m",
                speed.abs(),
                violation.total_distance
            );
        }
    }

    info!(
        "Total: {} violation(s), {} distinct track(s), dwell avg {:.2}s / min {:.2}s / max {:.2}s",
        stats.total_violations,
        stats.distinct_tracks,
        stats.average_duration,
        stats.min_duration,
        stats.max_duration
    );
}

pub fn save_statistics(stats: &Statistics, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).context("Failed to serialize statistics")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write statistics file {}", path.display()))?;
    Ok(())
}

/// Clock-of-day rendering of an epoch timestamp (UTC).
pub fn format_clock(epoch_seconds: f64) -> String {
    let total = epoch_seconds.max(0.0) as u64 % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Duration rendering: sub-minute dwells keep fractional precision,
/// anything longer reads as H:MM:SS.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{:.2}s", seconds);
    }
    let total = seconds as u64;
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
