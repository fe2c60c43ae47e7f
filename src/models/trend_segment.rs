use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trend label of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    /// Price rose by at least the breakout threshold
    Up,
    /// Price fell by at least the breakout threshold
    Down,
    /// No breakout within the segment
    Flat,
}

impl Trend {
    /// Label as written to the segment table
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "Up",
            Trend::Down => "Down",
            Trend::Flat => "Flat",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Trend::Up),
            "down" => Ok(Trend::Down),
            "flat" => Ok(Trend::Flat),
            _ => Err(format!("Invalid trend: {}. Valid options: Up, Down, Flat", s)),
        }
    }

    pub fn all() -> [Trend; 3] {
        [Trend::Up, Trend::Down, Trend::Flat]
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One labeled stretch of a symbol's price history under one config
///
/// Segments of the same (symbol, config) pair share their boundary points:
/// `segments[i].to_timestamp == segments[i + 1].from_timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSegment {
    pub symbol: String,
    pub config_id: String,
    pub trend: Trend,
    pub from_timestamp: DateTime<Utc>,
    pub to_timestamp: DateTime<Utc>,
    pub from_price: f64,
    pub to_price: f64,
}

impl TrendSegment {
    /// Wall-clock length of the segment
    pub fn duration(&self) -> chrono::Duration {
        self.to_timestamp - self.from_timestamp
    }
}
