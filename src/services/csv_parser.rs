use chrono::NaiveDate;
use csv::{Reader, Writer};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

use crate::constants::{CONFIG_HEADER, SEGMENT_HEADER};
use crate::error::{Error, Result};
use crate::models::{
    ClosePrice, PricePoint, ShareholdingRecord, Trend, TrendConfig, TrendSegment,
};
use crate::utils::{format_timestamp, format_timestamp_millis, parse_timestamp};

/// Header line is line 1, so the first data row is line 2
fn line_of(row_index: usize) -> usize {
    row_index + 2
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    standard_symbol: String,
    utc_datetime: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    average_price: Option<f64>,
}

/// Load a price table into averaged price points
///
/// Rows carry either a pre-averaged `average_price` or the four OHLC columns;
/// `average_price` wins when both are present. Row order is preserved.
pub fn load_price_points(path: &Path) -> Result<Vec<PricePoint>> {
    let mut reader = open_reader(path)?;
    let mut points = Vec::new();

    for (row_index, result) in reader.deserialize::<PriceRow>().enumerate() {
        let row = result?;
        let line = line_of(row_index);

        let timestamp = parse_timestamp(&row.utc_datetime)
            .map_err(|e| Error::Parse(format!("{} line {}: {}", path.display(), line, e)))?;

        let point = match (row.average_price, row.open, row.high, row.low, row.close) {
            (Some(price), ..) => PricePoint::new(row.standard_symbol, timestamp, price),
            (None, Some(open), Some(high), Some(low), Some(close)) => {
                PricePoint::from_ohlc(row.standard_symbol, timestamp, open, high, low, close)
            }
            _ => {
                return Err(Error::Parse(format!(
                    "{} line {}: row needs average_price or open/high/low/close",
                    path.display(),
                    line
                )))
            }
        };

        points.push(point);
    }

    tracing::info!(path = %path.display(), rows = points.len(), "Loaded price table");
    Ok(points)
}

#[derive(Debug, Deserialize)]
struct ConfigRow {
    config_id: String,
    display_name: Option<String>,
    from_utc_datetime: String,
    to_utc_datetime: String,
    trigger_diff_ratio: f64,
}

/// Load the trend config table
///
/// Every row is validated; a bad row fails the whole load since a config
/// table is small and hand-edited.
pub fn load_trend_configs(path: &Path) -> Result<Vec<TrendConfig>> {
    let mut reader = open_reader(path)?;
    let mut configs: Vec<TrendConfig> = Vec::new();

    for (row_index, result) in reader.deserialize::<ConfigRow>().enumerate() {
        let row = result?;
        let line = line_of(row_index);
        let context = |e: String| Error::Config(format!("{} line {}: {}", path.display(), line, e));

        let start = parse_timestamp(&row.from_utc_datetime).map_err(|e| context(e.to_string()))?;
        let end = parse_timestamp(&row.to_utc_datetime).map_err(|e| context(e.to_string()))?;

        let config = match row.display_name.filter(|name| !name.trim().is_empty()) {
            Some(name) => TrendConfig::with_display_name(
                row.config_id,
                name,
                start,
                end,
                row.trigger_diff_ratio,
            ),
            None => TrendConfig::new(row.config_id, start, end, row.trigger_diff_ratio),
        }
        .map_err(|e| context(e.to_string()))?;

        if configs.iter().any(|c| c.config_id() == config.config_id()) {
            return Err(context(format!("duplicate config_id '{}'", config.config_id())));
        }
        configs.push(config);
    }

    tracing::info!(path = %path.display(), configs = configs.len(), "Loaded trend configs");
    Ok(configs)
}

/// Write the trend config table
pub fn write_trend_configs(path: &Path, configs: &[TrendConfig]) -> Result<usize> {
    let mut writer = create_writer(path)?;
    writer.write_record(CONFIG_HEADER)?;

    for config in configs {
        writer.write_record([
            config.config_id(),
            config.display_name(),
            &format_timestamp_millis(&config.range_start()),
            &format_timestamp_millis(&config.range_end()),
            &config.trigger_ratio().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(configs.len())
}

/// Write the segment table to a file
pub fn write_segments(path: &Path, segments: &[TrendSegment]) -> Result<usize> {
    let writer = create_writer(path)?;
    write_segments_with(writer, segments)
}

/// Write the segment table to any sink (e.g. stdout)
pub fn write_segments_to<W: io::Write>(sink: W, segments: &[TrendSegment]) -> Result<usize> {
    write_segments_with(Writer::from_writer(sink), segments)
}

fn write_segments_with<W: io::Write>(mut writer: Writer<W>, segments: &[TrendSegment]) -> Result<usize> {
    writer.write_record(SEGMENT_HEADER)?;

    for segment in segments {
        writer.write_record([
            segment.symbol.as_str(),
            segment.config_id.as_str(),
            segment.trend.as_str(),
            &format_timestamp(&segment.from_timestamp),
            &format_timestamp(&segment.to_timestamp),
            &segment.from_price.to_string(),
            &segment.to_price.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(segments.len())
}

#[derive(Debug, Deserialize)]
struct SegmentRow {
    standard_symbol: String,
    config_id: String,
    trend: String,
    from_utc_datetime: String,
    to_utc_datetime: String,
    from_price: f64,
    to_price: f64,
}

/// Load a previously written segment table
pub fn load_segments(path: &Path) -> Result<Vec<TrendSegment>> {
    let mut reader = open_reader(path)?;
    let mut segments = Vec::new();

    for (row_index, result) in reader.deserialize::<SegmentRow>().enumerate() {
        let row = result?;
        let line = line_of(row_index);
        let context = |e: String| Error::Parse(format!("{} line {}: {}", path.display(), line, e));

        segments.push(TrendSegment {
            symbol: row.standard_symbol,
            config_id: row.config_id,
            trend: Trend::from_str(&row.trend).map_err(context)?,
            from_timestamp: parse_timestamp(&row.from_utc_datetime)
                .map_err(|e| context(e.to_string()))?,
            to_timestamp: parse_timestamp(&row.to_utc_datetime)
                .map_err(|e| context(e.to_string()))?,
            from_price: row.from_price,
            to_price: row.to_price,
        });
    }

    Ok(segments)
}

#[derive(Debug, Deserialize)]
struct ShareholdingRow {
    standard_symbol: String,
    participant_id: String,
    #[serde(default)]
    participant_name: String,
    ccass_date: String,
    shareholding_amount: f64,
}

/// Load CCASS participant shareholding rows
pub fn load_shareholding(path: &Path) -> Result<Vec<ShareholdingRecord>> {
    let mut reader = open_reader(path)?;
    let mut records = Vec::new();

    for (row_index, result) in reader.deserialize::<ShareholdingRow>().enumerate() {
        let row = result?;
        records.push(ShareholdingRecord {
            symbol: row.standard_symbol,
            participant_id: row.participant_id,
            participant_name: row.participant_name,
            ccass_date: parse_day(&row.ccass_date, path, line_of(row_index))?,
            shareholding_amount: row.shareholding_amount,
        });
    }

    tracing::info!(path = %path.display(), rows = records.len(), "Loaded CCASS shareholding");
    Ok(records)
}

#[derive(Debug, Deserialize)]
struct CloseRow {
    standard_symbol: String,
    as_of_date: String,
    close: f64,
}

/// Load daily close prices for the correlation report
pub fn load_close_prices(path: &Path) -> Result<Vec<ClosePrice>> {
    let mut reader = open_reader(path)?;
    let mut prices = Vec::new();

    for (row_index, result) in reader.deserialize::<CloseRow>().enumerate() {
        let row = result?;
        prices.push(ClosePrice {
            symbol: row.standard_symbol,
            as_of_date: parse_day(&row.as_of_date, path, line_of(row_index))?,
            close: row.close,
        });
    }

    tracing::info!(path = %path.display(), rows = prices.len(), "Loaded close prices");
    Ok(prices)
}

/// Dates in the CCASS tables sometimes carry a midnight time component
fn parse_day(value: &str, path: &Path, line: usize) -> Result<NaiveDate> {
    parse_timestamp(value)
        .map(|ts| ts.date_naive())
        .map_err(|e| Error::Parse(format!("{} line {}: {}", path.display(), line, e)))
}

fn open_reader(path: &Path) -> Result<Reader<fs::File>> {
    if !path.exists() {
        return Err(Error::NotFound(format!("{} does not exist", path.display())));
    }
    Ok(csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?)
}

fn create_writer(path: &Path) -> Result<Writer<fs::File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
    }
    Ok(Writer::from_path(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_ohlc_prices() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "prices.csv",
            "standard_symbol,utc_datetime,open,high,low,close\n\
             SEHK:00001,2018-01-02,10,12,8,10\n\
             SEHK:00001,2018-01-03 00:00:00,1,2,3,4\n",
        );

        let points = load_price_points(&path).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].price, 10.0);
        assert_eq!(points[1].price, 2.5);
        assert_eq!(
            points[1].timestamp,
            Utc.with_ymd_and_hms(2018, 1, 3, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_load_average_prices() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "prices.csv",
            "standard_symbol,utc_datetime,average_price\n\
             SEHK:02216,2025-05-02 00:00:00+00:00,1.75\n",
        );

        let points = load_price_points(&path).unwrap();
        assert_eq!(points[0].symbol, "SEHK:02216");
        assert_eq!(points[0].price, 1.75);
    }

    #[test]
    fn test_load_prices_reports_incomplete_row() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "prices.csv",
            "standard_symbol,utc_datetime,open,high,low,close\n\
             SEHK:00001,2018-01-02,10,12,8,10\n\
             SEHK:00001,2018-01-03,10,,8,10\n",
        );

        let err = load_price_points(&path).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{}", err);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_price_points(Path::new("/nonexistent/prices.csv")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_config_table_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("configs.csv");
        let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 5, 2, 0, 0, 0).unwrap();
        let configs = crate::models::generate_configs(start, end, &[0.3, 0.7]).unwrap();

        assert_eq!(write_trend_configs(&path, &configs).unwrap(), 2);
        let loaded = load_trend_configs(&path).unwrap();
        assert_eq!(loaded, configs);
    }

    #[test]
    fn test_config_table_keeps_sub_second_bounds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("configs.csv");
        let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::milliseconds(500);
        let end = Utc.with_ymd_and_hms(2025, 5, 2, 23, 59, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        let configs = vec![TrendConfig::new("c1", start, end, 0.5).unwrap()];

        write_trend_configs(&path, &configs).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("2018-01-01 00:00:00.500"), "{}", content);

        let loaded = load_trend_configs(&path).unwrap();
        assert_eq!(loaded[0].range_start(), start);
        assert_eq!(loaded[0].range_end(), end);
        assert_eq!(loaded, configs);
    }

    #[test]
    fn test_config_table_rejects_bad_ratio_and_duplicates() {
        let dir = TempDir::new().unwrap();
        let bad_ratio = write_file(
            &dir,
            "bad.csv",
            "config_id,display_name,from_utc_datetime,to_utc_datetime,trigger_diff_ratio\n\
             c1,,2018-01-01,2025-05-02,1.5\n",
        );
        assert!(matches!(load_trend_configs(&bad_ratio), Err(Error::Config(_))));

        let duplicate = write_file(
            &dir,
            "dup.csv",
            "config_id,display_name,from_utc_datetime,to_utc_datetime,trigger_diff_ratio\n\
             c1,,2018-01-01,2025-05-02,0.5\n\
             c1,,2018-01-01,2025-05-02,0.3\n",
        );
        let err = load_trend_configs(&duplicate).unwrap_err();
        assert!(err.to_string().contains("duplicate"), "{}", err);
    }

    #[test]
    fn test_config_without_display_name_gets_default() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "configs.csv",
            "config_id,from_utc_datetime,to_utc_datetime,trigger_diff_ratio\n\
             c1,2018-01-01,2025-05-02,0.5\n",
        );
        let configs = load_trend_configs(&path).unwrap();
        assert!(configs[0].display_name().ends_with("with trigger ratio 0.5"));
    }

    #[test]
    fn test_segment_table_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trend.csv");
        let segments = vec![TrendSegment {
            symbol: "SEHK:00001".to_string(),
            config_id: "c1".to_string(),
            trend: Trend::Down,
            from_timestamp: Utc.with_ymd_and_hms(2019, 3, 4, 0, 0, 0).unwrap(),
            to_timestamp: Utc.with_ymd_and_hms(2019, 6, 10, 0, 0, 0).unwrap(),
            from_price: 88.125,
            to_price: 70.5,
        }];

        write_segments(&path, &segments).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(
            "standard_symbol,config_id,trend,from_utc_datetime,to_utc_datetime,from_price,to_price"
        ));
        assert!(content.contains("SEHK:00001,c1,Down,2019-03-04 00:00:00,2019-06-10 00:00:00,88.125,70.5"));

        assert_eq!(load_segments(&path).unwrap(), segments);
    }

    #[test]
    fn test_load_ccass_tables() {
        let dir = TempDir::new().unwrap();
        let holdings = write_file(
            &dir,
            "holdings.csv",
            "standard_symbol,participant_id,participant_name,ccass_date,shareholding_amount\n\
             SEHK:02137,C00010,CITIBANK N.A.,2025-05-26,1000\n",
        );
        let closes = write_file(
            &dir,
            "closes.csv",
            "standard_symbol,as_of_date,close\n\
             SEHK:02137,2025-05-22 00:00:00,2.95\n",
        );

        let holdings = load_shareholding(&holdings).unwrap();
        assert_eq!(holdings[0].ccass_date, NaiveDate::from_ymd_opt(2025, 5, 26).unwrap());
        assert_eq!(holdings[0].participant_name, "CITIBANK N.A.");

        let closes = load_close_prices(&closes).unwrap();
        assert_eq!(closes[0].as_of_date, NaiveDate::from_ymd_opt(2025, 5, 22).unwrap());
        assert_eq!(closes[0].close, 2.95);
    }
}
