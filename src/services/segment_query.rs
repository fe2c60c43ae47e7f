//! Segment table queries used by the presentation side.

use serde::Serialize;

use crate::models::{Trend, TrendSegment};

/// Row filter over a segment table
#[derive(Debug, Clone, Default)]
pub struct SegmentFilter {
    /// Keep only these symbols (all when empty)
    pub symbols: Vec<String>,
    /// Keep only this config (all when `None`)
    pub config_id: Option<String>,
    /// Keep only this trend label (all when `None`)
    pub trend: Option<Trend>,
}

impl SegmentFilter {
    pub fn matches(&self, segment: &TrendSegment) -> bool {
        (self.symbols.is_empty() || self.symbols.iter().any(|s| *s == segment.symbol))
            && self
                .config_id
                .as_deref()
                .map_or(true, |id| id == segment.config_id)
            && self.trend.map_or(true, |t| t == segment.trend)
    }

    /// Matching rows, in table order
    pub fn apply<'a>(&self, segments: &'a [TrendSegment]) -> Vec<&'a TrendSegment> {
        segments.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Up / Down / Flat tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrendCounts {
    pub up: usize,
    pub down: usize,
    pub flat: usize,
}

impl TrendCounts {
    pub fn total(&self) -> usize {
        self.up + self.down + self.flat
    }
}

pub fn trend_counts<'a>(segments: impl IntoIterator<Item = &'a TrendSegment>) -> TrendCounts {
    segments
        .into_iter()
        .fold(TrendCounts::default(), |mut counts, segment| {
            match segment.trend {
                Trend::Up => counts.up += 1,
                Trend::Down => counts.down += 1,
                Trend::Flat => counts.flat += 1,
            }
            counts
        })
}
