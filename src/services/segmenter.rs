//! Breakout-threshold trend segmentation
//!
//! Walks a chronological price series once and cuts it into contiguous
//! Up / Down / Flat segments.
//!
//! The breakout threshold is `ratio * (max - min)` over the whole series (the
//! configured historical window), fixed for the run. The running min/max that
//! trigger a breakout belong to the currently open segment only and are reset
//! at every segment start.
//!
//! A breakout closes the open segment from its start through the breakout
//! point, and the next segment opens at that point. Segments therefore share
//! their boundary points and cover the full span of the series. Every
//! breakout under a larger ratio has a breakout under a smaller ratio at or
//! before it, so raising the ratio never adds segments.

use crate::error::SegmentError;
use crate::models::trend_config::validate_ratio;
use crate::models::{PricePoint, Trend, TrendConfig, TrendSegment};

/// Segment a single-symbol series with the given trigger ratio
///
/// # Arguments
/// * `series` - Price points of one symbol, strictly increasing in time
/// * `config_id` - Id stamped on every produced segment
/// * `ratio` - Trigger ratio in (0, 1]
///
/// # Returns
/// * Ordered, contiguous segments covering the whole series
pub fn segment(
    series: &[PricePoint],
    config_id: &str,
    ratio: f64,
) -> Result<Vec<TrendSegment>, SegmentError> {
    validate_ratio(ratio)?;
    validate_series(series)?;

    let (min_price, max_price) = price_range(series).ok_or(SegmentError::EmptySeries)?;
    let threshold = breakout_threshold(min_price, max_price, ratio);

    let segments = scan(series, config_id, threshold);

    tracing::debug!(
        symbol = %series[0].symbol,
        config_id,
        points = series.len(),
        threshold,
        segments = segments.len(),
        "Segmented series"
    );

    Ok(segments)
}

/// Restrict a series to the config window, then segment it
///
/// Error indices refer to positions in `series`, not in the window.
pub fn segment_for_config(
    series: &[PricePoint],
    config: &TrendConfig,
) -> Result<Vec<TrendSegment>, SegmentError> {
    let positions: Vec<usize> = series
        .iter()
        .enumerate()
        .filter(|(_, p)| config.contains(&p.timestamp))
        .map(|(i, _)| i)
        .collect();
    let windowed: Vec<PricePoint> = positions.iter().map(|&i| series[i].clone()).collect();

    segment(&windowed, config.config_id(), config.trigger_ratio())
        .map_err(|e| to_series_index(e, &positions))
}

fn to_series_index(error: SegmentError, positions: &[usize]) -> SegmentError {
    let remap = |index: usize| positions.get(index).copied().unwrap_or(index);
    match error {
        SegmentError::NonMonotonicInput {
            index,
            previous,
            current,
        } => SegmentError::NonMonotonicInput {
            index: remap(index),
            previous,
            current,
        },
        SegmentError::InvalidPrice { index, price } => SegmentError::InvalidPrice {
            index: remap(index),
            price,
        },
        other => other,
    }
}

/// Points of `series` that fall inside the config window (inclusive)
pub fn window_slice(series: &[PricePoint], config: &TrendConfig) -> Vec<PricePoint> {
    series
        .iter()
        .filter(|p| config.contains(&p.timestamp))
        .cloned()
        .collect()
}

/// Absolute price move that triggers a breakout
pub fn breakout_threshold(min_price: f64, max_price: f64, ratio: f64) -> f64 {
    ratio * (max_price - min_price)
}

/// Global (min, max) price of a series, `None` when empty
pub fn price_range(series: &[PricePoint]) -> Option<(f64, f64)> {
    let first = series.first()?.price;
    Some(series.iter().fold((first, first), |(lo, hi), p| {
        (lo.min(p.price), hi.max(p.price))
    }))
}

/// Reject inputs the scan cannot segment faithfully
fn validate_series(series: &[PricePoint]) -> Result<(), SegmentError> {
    let first = series.first().ok_or(SegmentError::EmptySeries)?;

    for (index, point) in series.iter().enumerate() {
        if !point.price.is_finite() {
            return Err(SegmentError::InvalidPrice {
                index,
                price: point.price,
            });
        }
        if point.symbol != first.symbol {
            return Err(SegmentError::MixedSymbols {
                expected: first.symbol.clone(),
                found: point.symbol.clone(),
            });
        }
        if index > 0 {
            let previous = &series[index - 1];
            if point.timestamp <= previous.timestamp {
                return Err(SegmentError::NonMonotonicInput {
                    index,
                    previous: previous.timestamp.to_rfc3339(),
                    current: point.timestamp.to_rfc3339(),
                });
            }
        }
    }

    Ok(())
}

/// Single forward pass over a validated, non-empty series
fn scan(series: &[PricePoint], config_id: &str, threshold: f64) -> Vec<TrendSegment> {
    let mut segments = Vec::new();
    let last = series.len() - 1;

    let mut start = 0;
    let mut segment_min = series[0].price;
    let mut segment_max = series[0].price;

    for i in 1..series.len() {
        let price = series[i].price;
        segment_min = segment_min.min(price);
        segment_max = segment_max.max(price);

        // A zero threshold means the window never moved; nothing can break out.
        if threshold <= 0.0 {
            continue;
        }

        let trend = if price - segment_min >= threshold {
            Some(Trend::Up)
        } else if segment_max - price >= threshold {
            Some(Trend::Down)
        } else {
            None
        };

        if let Some(trend) = trend {
            segments.push(build_segment(series, config_id, trend, start, i));
            start = i;
            segment_min = price;
            segment_max = price;
        }
    }

    // Close whatever is still open. A breakout on the last point leaves
    // nothing open, except for a one-point series.
    if start < last || segments.is_empty() {
        segments.push(build_segment(series, config_id, Trend::Flat, start, last));
    }

    segments
}

fn build_segment(
    series: &[PricePoint],
    config_id: &str,
    trend: Trend,
    from: usize,
    to: usize,
) -> TrendSegment {
    TrendSegment {
        symbol: series[from].symbol.clone(),
        config_id: config_id.to_string(),
        trend,
        from_timestamp: series[from].timestamp,
        to_timestamp: series[to].timestamp,
        from_price: series[from].price,
        to_price: series[to].price,
    }
}
