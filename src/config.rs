use crate::types::{
    Config, EstimatorConfig, LoggingConfig, ReplayConfig, ReportConfig, ZoneConfig,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zone: ZoneConfig { vertices: Vec::new() },
            estimator: EstimatorConfig::default(),
            replay: ReplayConfig {
                detections_path: "detections.jsonl".to_string(),
            },
            report: ReportConfig {
                show_alerts: true,
                statistics_path: Some("zone_violations_statistics.json".to_string()),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            real_height_m: 1.76,    // average person height
            pixel_height_ref: 384.0, // apparent height at the calibration distance
            fps: 30.0,
            speed_interval: 5,
            history_window: 8,
        }
    }
}
