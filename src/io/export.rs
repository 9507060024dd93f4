//! Write `.stat` tables and JSON stats exports.
//!
//! The `.stat` format is consumed by downstream merge/plot tooling; the JSON
//! form carries the same numbers plus generation metadata.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::report::AlgorithmStats;
use crate::report::format::format_stats_table;

/// JSON export schema.
#[derive(Debug, Clone, Serialize)]
pub struct StatsFile<'a> {
    pub tool: &'static str,
    pub satellite: &'a str,
    pub generated_at: DateTime<Utc>,
    pub stats: &'a [AlgorithmStats],
}

/// Write the whitespace `.stat` table.
pub fn write_stats_table(path: &Path, satellite: &str, stats: &[AlgorithmStats]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::input(format!("Failed to create stat table '{}': {e}", path.display()))
    })?;
    file.write_all(format_stats_table(satellite, stats).as_bytes())
        .map_err(|e| AppError::input(format!("Failed to write stat table: {e}")))?;
    Ok(())
}

/// Write the JSON export.
pub fn write_stats_json(path: &Path, satellite: &str, stats: &[AlgorithmStats]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!("Failed to create stats JSON '{}': {e}", path.display()))
    })?;
    let payload = StatsFile {
        tool: "pst",
        satellite,
        generated_at: Utc::now(),
        stats,
    };
    serde_json::to_writer_pretty(file, &payload)
        .map_err(|e| AppError::input(format!("Failed to write stats JSON: {e}")))?;
    Ok(())
}
