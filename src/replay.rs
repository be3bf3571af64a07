// src/replay.rs
//
// File-based stand-in for the external detector/tracker: one JSON record
// per line, one line per frame. Lets the whole pipeline run against a
// recorded stream without any vision stack attached.

use crate::types::Detection;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::info;

/// One frame of detector output.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameRecord {
    /// Wall-clock seconds for this frame. When absent, the caller derives it
    /// from the frame index and the configured fps.
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

pub struct ReplaySource {
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl ReplaySource {
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening detection stream: {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open detections file {}", path.display()))?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }
}

impl Iterator for ReplaySource {
    type Item = Result<FrameRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let record = parse_record(&line)
                .with_context(|| format!("Invalid frame record on line {}", self.line_number));
            return Some(record);
        }
    }
}

pub fn parse_record(line: &str) -> Result<FrameRecord> {
    serde_json::from_str(line).context("Malformed frame record")
}
