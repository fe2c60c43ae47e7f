//! Batch segmentation over every (symbol, config) pair.
//!
//! Pairs are independent, so they run on the rayon pool unless the caller asks
//! for a sequential run. A failing pair is logged and recorded in the report;
//! it never stops the rest of the batch.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::SegmentError;
use crate::models::{PricePoint, SeriesBySymbol, TrendConfig, TrendSegment};
use crate::services::segmenter::segment_for_config;

/// Options for a batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Evaluate pairs on the rayon thread pool
    pub parallel: bool,

    /// Restrict the run to these symbols (all symbols when `None`)
    pub symbols: Option<Vec<String>>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            symbols: None,
        }
    }
}

/// A (symbol, config) pair that could not be segmented
#[derive(Debug, Clone, Serialize)]
pub struct PairFailure {
    pub symbol: String,
    pub config_id: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: SegmentError,
}

fn serialize_error<S: serde::Serializer>(error: &SegmentError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&error.to_string())
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// All segments, sorted by (symbol, from timestamp, config id)
    pub segments: Vec<TrendSegment>,
    pub failures: Vec<PairFailure>,
    pub pairs_attempted: usize,
}

impl BatchReport {
    pub fn pairs_succeeded(&self) -> usize {
        self.pairs_attempted - self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Group loaded points by symbol, each series sorted by timestamp
///
/// The sort is stable and does not drop duplicates; a duplicated timestamp is
/// left for the segmenter to reject.
pub fn group_by_symbol(points: Vec<PricePoint>) -> SeriesBySymbol {
    let mut grouped = SeriesBySymbol::new();
    for point in points {
        grouped.entry(point.symbol.clone()).or_default().push(point);
    }
    for series in grouped.values_mut() {
        series.sort_by_key(|p| p.timestamp);
    }
    grouped
}

/// Segment every (symbol, config) pair
pub fn run_batch(
    series_by_symbol: &SeriesBySymbol,
    configs: &[TrendConfig],
    options: &BatchOptions,
) -> BatchReport {
    let pairs: Vec<(&str, &[PricePoint], &TrendConfig)> = series_by_symbol
        .iter()
        .filter(|(symbol, _)| {
            options
                .symbols
                .as_ref()
                .map_or(true, |wanted| wanted.iter().any(|s| s == *symbol))
        })
        .flat_map(|(symbol, series)| {
            configs
                .iter()
                .map(move |config| (symbol.as_str(), series.as_slice(), config))
        })
        .collect();

    tracing::info!(
        symbols = series_by_symbol.len(),
        configs = configs.len(),
        pairs = pairs.len(),
        parallel = options.parallel,
        "Starting batch segmentation"
    );

    let outcomes: Vec<_> = if options.parallel {
        pairs
            .par_iter()
            .map(|&(symbol, series, config)| run_pair(symbol, series, config))
            .collect()
    } else {
        pairs
            .iter()
            .map(|&(symbol, series, config)| run_pair(symbol, series, config))
            .collect()
    };

    let mut report = BatchReport {
        pairs_attempted: pairs.len(),
        ..Default::default()
    };

    for (symbol, config_id, outcome) in outcomes {
        match outcome {
            Ok(segments) => report.segments.extend(segments),
            Err(error) => {
                tracing::warn!(symbol, config_id, %error, "Skipping pair");
                report.failures.push(PairFailure {
                    symbol: symbol.to_string(),
                    config_id: config_id.to_string(),
                    error,
                });
            }
        }
    }

    sort_segments(&mut report.segments);

    tracing::info!(
        segments = report.segments.len(),
        failed_pairs = report.failures.len(),
        "Batch segmentation finished"
    );

    report
}

fn run_pair<'a>(
    symbol: &'a str,
    series: &[PricePoint],
    config: &'a TrendConfig,
) -> (&'a str, &'a str, Result<Vec<TrendSegment>, SegmentError>) {
    (symbol, config.config_id(), segment_for_config(series, config))
}

/// Order segments by (symbol, from timestamp), ties broken by config id
pub fn sort_segments(segments: &mut [TrendSegment]) {
    segments.sort_by(|a, b| {
        a.symbol
            .cmp(&b.symbol)
            .then(a.from_timestamp.cmp(&b.from_timestamp))
            .then(a.config_id.cmp(&b.config_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trend;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn points(symbol: &str, prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(symbol, day(i as i64), p))
            .collect()
    }

    fn configs() -> Vec<TrendConfig> {
        vec![
            TrendConfig::new("r5", day(0), day(100), 0.5).unwrap(),
            TrendConfig::new("r10", day(0), day(100), 1.0).unwrap(),
        ]
    }

    #[test]
    fn test_group_by_symbol_sorts_each_series() {
        let mut all = points("B", &[1.0, 2.0]);
        let mut a = points("A", &[5.0, 6.0, 7.0]);
        a.reverse();
        all.extend(a);

        let grouped = group_by_symbol(all);
        assert_eq!(grouped.keys().cloned().collect::<Vec<_>>(), vec!["A", "B"]);
        let a_series = &grouped["A"];
        assert!(a_series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(a_series[0].price, 5.0);
    }

    #[test]
    fn test_run_batch_covers_all_pairs_in_order() {
        let mut all = points("SEHK:00002", &[1.0, 1.0, 2.0, 3.0, 1.0]);
        all.extend(points("SEHK:00001", &[4.0, 4.0, 4.0]));
        let grouped = group_by_symbol(all);

        let report = run_batch(&grouped, &configs(), &BatchOptions::default());

        assert_eq!(report.pairs_attempted, 4);
        assert!(report.is_clean());
        assert_eq!(report.pairs_succeeded(), 4);

        // SEHK:00001 is constant: one Flat per config
        let first: Vec<_> = report
            .segments
            .iter()
            .filter(|s| s.symbol == "SEHK:00001")
            .collect();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|s| s.trend == Trend::Flat));

        // Output is sorted by symbol, then start
        for pair in report.segments.windows(2) {
            let key = |s: &TrendSegment| (s.symbol.clone(), s.from_timestamp, s.config_id.clone());
            assert!(key(&pair[0]) <= key(&pair[1]));
        }

        let r5: Vec<_> = report
            .segments
            .iter()
            .filter(|s| s.symbol == "SEHK:00002" && s.config_id == "r5")
            .map(|s| s.trend)
            .collect();
        assert_eq!(r5, vec![Trend::Up, Trend::Up, Trend::Down]);
    }

    #[test]
    fn test_failed_pair_does_not_abort_batch() {
        let mut bad = points("BAD", &[1.0, 2.0, 3.0]);
        bad[2].timestamp = bad[1].timestamp;
        let mut all = bad;
        all.extend(points("GOOD", &[1.0, 3.0]));
        let grouped = group_by_symbol(all);

        let report = run_batch(&grouped, &configs(), &BatchOptions::default());

        assert_eq!(report.pairs_attempted, 4);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures.iter().all(|f| f.symbol == "BAD"));
        assert!(report
            .failures
            .iter()
            .all(|f| matches!(f.error, SegmentError::NonMonotonicInput { .. })));
        assert!(report.segments.iter().all(|s| s.symbol == "GOOD"));
        assert_eq!(report.segments.len(), 2);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let mut all = points("X", &[3.0, 7.0, 2.0, 9.0, 4.0, 4.5, 1.0, 8.0]);
        all.extend(points("Y", &[10.0, 13.0, 11.0, 16.0, 12.0, 20.0]));
        let grouped = group_by_symbol(all);

        let parallel = run_batch(&grouped, &configs(), &BatchOptions::default());
        let sequential = run_batch(
            &grouped,
            &configs(),
            &BatchOptions {
                parallel: false,
                ..Default::default()
            },
        );
        assert_eq!(parallel.segments, sequential.segments);
    }

    #[test]
    fn test_symbol_filter() {
        let mut all = points("X", &[1.0, 2.0]);
        all.extend(points("Y", &[1.0, 2.0]));
        let grouped = group_by_symbol(all);

        let options = BatchOptions {
            symbols: Some(vec!["Y".to_string()]),
            ..Default::default()
        };
        let report = run_batch(&grouped, &configs(), &options);
        assert_eq!(report.pairs_attempted, 2);
        assert!(report.segments.iter().all(|s| s.symbol == "Y"));
    }

    #[test]
    fn test_empty_window_is_reported() {
        let grouped = group_by_symbol(points("X", &[1.0, 2.0]));
        let late = vec![TrendConfig::new("late", day(50), day(60), 0.5).unwrap()];

        let report = run_batch(&grouped, &late, &BatchOptions::default());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].error, SegmentError::EmptySeries);
    }
}
