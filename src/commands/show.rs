use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{Trend, TrendSegment};
use crate::services::{self, SegmentFilter};
use crate::utils::{default_trend_path, parse_symbol_list};

pub fn run(
    input: Option<PathBuf>,
    symbols: Option<String>,
    config: Option<String>,
    trend: Option<String>,
    json: bool,
) {
    let input = input.unwrap_or_else(default_trend_path);

    let trend = match trend.as_deref().map(Trend::from_str).transpose() {
        Ok(trend) => trend,
        Err(e) => {
            eprintln!("❌ Error parsing trend: {}", e);
            std::process::exit(1);
        }
    };

    let filter = SegmentFilter {
        symbols: symbols.as_deref().map(parse_symbol_list).unwrap_or_default(),
        config_id: config,
        trend,
    };

    match show_segments(&input, &filter, json) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn show_segments(input: &Path, filter: &SegmentFilter, json: bool) -> Result<()> {
    let table = services::load_segments(input)?;
    let rows = filter.apply(&table);

    if rows.is_empty() {
        eprintln!("⚠️  No segments match in {}", input.display());
        return Ok(());
    }

    // stdout carries only the table so it can be piped
    if json {
        let body = serde_json::to_string_pretty(&rows)?;
        println!("{}", body);
    } else {
        let owned: Vec<TrendSegment> = rows.iter().map(|s| (*s).clone()).collect();
        services::write_segments_to(io::stdout().lock(), &owned)?;
    }

    let counts = services::trend_counts(rows.iter().copied());
    eprintln!(
        "\n📊 {} segments: {} Up, {} Down, {} Flat",
        counts.total(),
        counts.up,
        counts.down,
        counts.flat
    );

    Ok(())
}
