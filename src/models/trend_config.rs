use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SegmentError;

/// Configuration for one trend classification run
///
/// Fixes the historical window whose global min/max form the baseline and the
/// fraction of that range that counts as a breakout. Fields are private so a
/// config can only exist in a validated state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendConfig {
    config_id: String,
    display_name: String,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    trigger_ratio: f64,
}

impl TrendConfig {
    /// Create a validated config with the default display name
    pub fn new(
        config_id: impl Into<String>,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        trigger_ratio: f64,
    ) -> Result<Self, SegmentError> {
        let display_name = default_display_name(&range_start, &range_end, trigger_ratio);
        Self::with_display_name(config_id, display_name, range_start, range_end, trigger_ratio)
    }

    /// Create a validated config with an explicit display name
    pub fn with_display_name(
        config_id: impl Into<String>,
        display_name: impl Into<String>,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        trigger_ratio: f64,
    ) -> Result<Self, SegmentError> {
        let config_id = config_id.into();

        if config_id.trim().is_empty() {
            return Err(SegmentError::InvalidConfiguration(
                "config_id must not be empty".to_string(),
            ));
        }
        validate_ratio(trigger_ratio)?;
        if range_start > range_end {
            return Err(SegmentError::InvalidConfiguration(format!(
                "window start {} is after window end {}",
                range_start, range_end
            )));
        }

        Ok(Self {
            config_id,
            display_name: display_name.into(),
            range_start,
            range_end,
            trigger_ratio,
        })
    }

    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn range_start(&self) -> DateTime<Utc> {
        self.range_start
    }

    pub fn range_end(&self) -> DateTime<Utc> {
        self.range_end
    }

    pub fn trigger_ratio(&self) -> f64 {
        self.trigger_ratio
    }

    /// Whether a timestamp falls inside the window (both ends inclusive)
    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.range_start && *timestamp <= self.range_end
    }
}

/// Check that a trigger ratio lies in (0, 1]
pub fn validate_ratio(ratio: f64) -> Result<(), SegmentError> {
    if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
        return Err(SegmentError::InvalidConfiguration(format!(
            "trigger ratio must be in (0, 1], got {}",
            ratio
        )));
    }
    Ok(())
}

/// Display name in the form used by the published config table:
/// `From 2018-01-01 00:00:00.000 to 2025-05-02 00:00:00.000 with trigger ratio 0.3`
pub fn default_display_name(start: &DateTime<Utc>, end: &DateTime<Utc>, ratio: f64) -> String {
    format!(
        "From {} to {} with trigger ratio {}",
        start.format("%Y-%m-%d %H:%M:%S%.3f"),
        end.format("%Y-%m-%d %H:%M:%S%.3f"),
        ratio
    )
}

/// Config id derived from the window and ratio, e.g. `trend_20180101_20250502_r0.3`
pub fn default_config_id(start: &DateTime<Utc>, end: &DateTime<Utc>, ratio: f64) -> String {
    format!(
        "trend_{}_{}_r{}",
        start.format("%Y%m%d"),
        end.format("%Y%m%d"),
        ratio
    )
}

/// Build one config per trigger ratio over a shared window
pub fn generate_configs(
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    ratios: &[f64],
) -> Result<Vec<TrendConfig>, SegmentError> {
    if ratios.is_empty() {
        return Err(SegmentError::InvalidConfiguration(
            "at least one trigger ratio is required".to_string(),
        ));
    }

    ratios
        .iter()
        .map(|&ratio| {
            TrendConfig::new(
                default_config_id(&range_start, &range_end, ratio),
                range_start,
                range_end,
                ratio,
            )
        })
        .collect()
}
