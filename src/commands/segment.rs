use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::services::{self, BatchOptions};
use crate::utils::{default_config_path, default_price_path, default_trend_path, parse_symbol_list};

pub fn run(
    prices: Option<PathBuf>,
    configs: Option<PathBuf>,
    output: Option<PathBuf>,
    symbols: Option<String>,
    sequential: bool,
) {
    let prices = prices.unwrap_or_else(default_price_path);
    let configs = configs.unwrap_or_else(default_config_path);
    let output = output.unwrap_or_else(default_trend_path);

    println!("📁 Prices:  {}", prices.display());
    println!("📁 Configs: {}", configs.display());
    if sequential {
        println!("🐢 Sequential mode: pairs are evaluated one at a time");
    }

    let options = BatchOptions {
        parallel: !sequential,
        symbols: symbols.as_deref().map(parse_symbol_list),
    };

    match segment_all(&prices, &configs, &output, &options) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("\n❌ Segmentation failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn segment_all(
    prices: &Path,
    configs: &Path,
    output: &Path,
    options: &BatchOptions,
) -> Result<()> {
    let points = services::load_price_points(prices)?;
    let configs = services::load_trend_configs(configs)?;
    let series_by_symbol = services::group_by_symbol(points);

    println!(
        "\n📈 {} symbols × {} configs",
        series_by_symbol.len(),
        configs.len()
    );

    let report = services::run_batch(&series_by_symbol, &configs, options);

    if !report.is_clean() {
        println!("\n⚠️  {} pairs could not be segmented:", report.failures.len());
        for failure in &report.failures {
            println!("   {} / {} - {}", failure.symbol, failure.config_id, failure.error);
        }
    }

    let written = services::write_segments(output, &report.segments)?;

    println!(
        "\n✅ {} of {} pairs segmented",
        report.pairs_succeeded(),
        report.pairs_attempted
    );
    println!("💾 Wrote {} segments to {}", written, output.display());

    Ok(())
}
