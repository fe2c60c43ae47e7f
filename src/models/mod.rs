mod price_point;
mod trend_segment;
pub mod ccass;
pub mod trend_config;

pub use ccass::{ClosePrice, MoneyClass, ParticipantCorrelation, ShareholdingRecord};
pub use price_point::{average_price, PricePoint};
pub use trend_config::{generate_configs, TrendConfig};
pub use trend_segment::{Trend, TrendSegment};

use std::collections::BTreeMap;

/// Chronological price series for a single symbol
pub type PriceSeries = Vec<PricePoint>;

/// Price series keyed by symbol, iterated in symbol order
pub type SeriesBySymbol = BTreeMap<String, PriceSeries>;
