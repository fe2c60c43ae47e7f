use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One averaged price observation of a symbol
///
/// The price is the mean of the day's open, high, low and close, so a single
/// number stands in for the whole candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Standard symbol, e.g. `SEHK:00001`
    pub symbol: String,

    /// Timestamp of the observation
    pub timestamp: DateTime<Utc>,

    /// Average price for the period
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point from an already averaged price
    pub fn new(symbol: impl Into<String>, timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            price,
        }
    }

    /// Create a price point from a full candle
    pub fn from_ohlc(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> Self {
        Self::new(symbol, timestamp, average_price(open, high, low, close))
    }
}

/// Average Price = (Open + High + Low + Close) / 4
pub fn average_price(open: f64, high: f64, low: f64, close: f64) -> f64 {
    (open + high + low + close) / 4.0
}
