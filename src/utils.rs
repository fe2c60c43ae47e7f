use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::PathBuf;

use crate::constants::{DEFAULT_CONFIG_FILE, DEFAULT_PRICE_FILE, DEFAULT_TREND_FILE};
use crate::error::{Error, Result};

/// Get trend data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("TREND_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Default location of the price table
pub fn default_price_path() -> PathBuf {
    get_data_dir().join(DEFAULT_PRICE_FILE)
}

/// Default location of the trend config table
pub fn default_config_path() -> PathBuf {
    get_data_dir().join(DEFAULT_CONFIG_FILE)
}

/// Default location of the segment output table
pub fn default_trend_path() -> PathBuf {
    get_data_dir().join(DEFAULT_TREND_FILE)
}

/// Parse a timestamp in any of the formats found in the source tables.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS[.fff]` (read as UTC) and RFC 3339.
pub fn parse_timestamp(time_str: &str) -> Result<DateTime<Utc>> {
    let trimmed = time_str.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    // pandas writes tz-aware columns as "2018-01-02 00:00:00+00:00"
    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::Parse(format!("Invalid timestamp: '{}'", time_str)))
}

/// Format a timestamp the way the segment table stores it
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a window bound with milliseconds, as the config table stores it
pub fn format_timestamp_millis(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Parse a comma-separated list of ratios (e.g. "0.3,0.5,0.7")
pub fn parse_ratio_list(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|e| Error::Parse(format!("Invalid ratio '{}': {}", part, e)))
        })
        .collect()
}

/// Split a comma-separated list of symbols, dropping blanks
pub fn parse_symbol_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
