use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::services;
use crate::utils::{default_config_path, default_price_path, format_timestamp};

pub fn run(prices: Option<PathBuf>, configs: Option<PathBuf>, symbol: Option<String>) {
    println!("📊 Window Summary\n");

    match show_summary(
        &prices.unwrap_or_else(default_price_path),
        &configs.unwrap_or_else(default_config_path),
        symbol.as_deref(),
    ) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn show_summary(prices: &Path, configs: &Path, symbol: Option<&str>) -> Result<()> {
    let mut series_by_symbol = services::group_by_symbol(services::load_price_points(prices)?);
    let configs = services::load_trend_configs(configs)?;

    if let Some(symbol) = symbol {
        series_by_symbol.retain(|s, _| s == symbol);
    }

    if series_by_symbol.is_empty() {
        println!("⚠️  No price data found.");
        return Ok(());
    }

    let summaries = services::summarize_all(&series_by_symbol, &configs);
    let mut current_symbol = "";

    for summary in &summaries {
        if summary.symbol != current_symbol {
            if !current_symbol.is_empty() {
                println!("\n═══════════════════════════════════════════════════════════\n");
            }
            current_symbol = &summary.symbol;
            println!("🔹 {}", summary.symbol);
        }

        println!("   {} (ratio {})", summary.config_id, summary.trigger_ratio);
        println!(
            "      {:>8} points  ({} → {})",
            format_number(summary.point_count),
            format_timestamp(&summary.first),
            format_timestamp(&summary.last)
        );
        println!(
            "      Min {:.4}  Max {:.4}  Diff {:.4}  Threshold {:.4}",
            summary.min_price, summary.max_price, summary.max_min_diff, summary.breakout_threshold
        );
    }

    let skipped = series_by_symbol.len() * configs.len() - summaries.len();
    if skipped > 0 {
        println!("\n💡 {} pairs have no points inside their window", skipped);
    }

    Ok(())
}

fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}
