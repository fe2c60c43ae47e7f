use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{PricePoint, SeriesBySymbol, TrendConfig};
use crate::services::segmenter::{breakout_threshold, price_range, window_slice};

/// Baseline figures for one (symbol, config) window
#[derive(Debug, Clone, Serialize)]
pub struct WindowSummary {
    pub symbol: String,
    pub config_id: String,
    pub point_count: usize,
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
    pub min_price: f64,
    pub max_price: f64,
    pub trigger_ratio: f64,
    pub max_min_diff: f64,
    /// `trigger_ratio * max_min_diff`, the move that counts as a breakout
    pub breakout_threshold: f64,
}

/// Summarize one symbol's window, `None` when no point falls inside it
pub fn summarize_window(series: &[PricePoint], config: &TrendConfig) -> Option<WindowSummary> {
    let windowed = window_slice(series, config);
    let (min_price, max_price) = price_range(&windowed)?;
    let first = windowed.iter().map(|p| p.timestamp).min()?;
    let last = windowed.iter().map(|p| p.timestamp).max()?;

    Some(WindowSummary {
        symbol: windowed[0].symbol.clone(),
        config_id: config.config_id().to_string(),
        point_count: windowed.len(),
        first,
        last,
        min_price,
        max_price,
        trigger_ratio: config.trigger_ratio(),
        max_min_diff: max_price - min_price,
        breakout_threshold: breakout_threshold(min_price, max_price, config.trigger_ratio()),
    })
}

/// Summaries for every (symbol, config) pair that has data in its window
pub fn summarize_all(series_by_symbol: &SeriesBySymbol, configs: &[TrendConfig]) -> Vec<WindowSummary> {
    series_by_symbol
        .values()
        .flat_map(|series| {
            configs
                .iter()
                .filter_map(move |config| summarize_window(series, config))
        })
        .collect()
}
