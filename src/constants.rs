//! Table Format Constants
//!
//! Column names and default file names for the CSV tables the crate reads
//! and writes.
//!
//! ## Price table
//! `standard_symbol, utc_datetime` plus either the four OHLC columns or a
//! pre-averaged `average_price` column.
//!
//! ## Trend config table
//! `config_id, display_name, from_utc_datetime, to_utc_datetime, trigger_diff_ratio`
//!
//! ## Segment table
//! `standard_symbol, config_id, trend, from_utc_datetime, to_utc_datetime, from_price, to_price`

/// Default price table file name (inside the data directory)
pub const DEFAULT_PRICE_FILE: &str = "stock_prices.csv";

/// Default trend config table file name
pub const DEFAULT_CONFIG_FILE: &str = "stock_trend_config.csv";

/// Default segment output file name
pub const DEFAULT_TREND_FILE: &str = "stock_trend.csv";

/// Header of the segment table, in column order
pub const SEGMENT_HEADER: [&str; 7] = [
    "standard_symbol",
    "config_id",
    "trend",
    "from_utc_datetime",
    "to_utc_datetime",
    "from_price",
    "to_price",
];

/// Header of the trend config table, in column order
pub const CONFIG_HEADER: [&str; 5] = [
    "config_id",
    "display_name",
    "from_utc_datetime",
    "to_utc_datetime",
    "trigger_diff_ratio",
];

/// Default historical window start (inclusive)
pub const DEFAULT_WINDOW_START: &str = "2018-01-01";

/// Default historical window end (inclusive)
pub const DEFAULT_WINDOW_END: &str = "2025-05-02";

/// Trigger ratios of the published trend tables
pub const DEFAULT_TRIGGER_RATIOS: [f64; 3] = [0.3, 0.5, 0.7];

/// Significance levels offered by the correlation report
pub const ALLOWED_P_VALUES: [f64; 3] = [0.001, 0.01, 0.05];

/// Default significance level for rejecting the null hypothesis
pub const DEFAULT_MAX_P_VALUE: f64 = 0.05;

/// CCASS participant ids treated as "smart money"
pub mod smart_money {
    /// Goldman Sachs
    pub const GOLDMAN_SACHS: &str = "B01451";
    /// JP Morgan (two participant accounts)
    pub const JP_MORGAN: [&str; 2] = ["B01504", "B01110"];
    /// Morgan Stanley
    pub const MORGAN_STANLEY: &str = "B01274";
    /// HSBC
    pub const HSBC: &str = "C00019";
    /// UBS
    pub const UBS: &str = "B01161";
    /// Merrill Lynch
    pub const MERRILL_LYNCH: &str = "B01224";
    /// Citibank
    pub const CITIBANK: &str = "C00010";

    pub const ALL: [&str; 8] = [
        GOLDMAN_SACHS,
        JP_MORGAN[0],
        JP_MORGAN[1],
        MORGAN_STANLEY,
        HSBC,
        UBS,
        MERRILL_LYNCH,
        CITIBANK,
    ];
}

/// CCASS participant ids treated as "dumb money" (retail-facing brokers)
pub mod dumb_money {
    /// Futu Securities
    pub const FUTU: &str = "B01955";
    /// Bright Smart Securities International
    pub const BRIGHT_SMART: &str = "B01668";
    /// Valuable Capital Ltd
    pub const VALUABLE_CAPITAL: &str = "B01904";

    pub const ALL: [&str; 3] = [FUTU, BRIGHT_SMART, VALUABLE_CAPITAL];
}
