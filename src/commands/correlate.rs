use std::path::{Path, PathBuf};

use crate::constants::{ALLOWED_P_VALUES, DEFAULT_MAX_P_VALUE};
use crate::error::Result;
use crate::models::{MoneyClass, ParticipantCorrelation};
use crate::services;

pub fn run(shareholding: PathBuf, prices: PathBuf, max_p_value: Option<f64>, symbol: Option<String>) {
    let max_p_value = max_p_value.unwrap_or(DEFAULT_MAX_P_VALUE);

    println!("🏦 CCASS Shareholding vs. Price\n");
    println!("📁 Shareholding: {}", shareholding.display());
    println!("📁 Prices:       {}", prices.display());

    match show_correlations(&shareholding, &prices, max_p_value, symbol.as_deref()) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            eprintln!("   Valid max p-values: {:?}", ALLOWED_P_VALUES);
            std::process::exit(1);
        }
    }
}

fn show_correlations(
    shareholding: &Path,
    prices: &Path,
    max_p_value: f64,
    symbol: Option<&str>,
) -> Result<()> {
    let mut holdings = services::load_shareholding(shareholding)?;
    let mut closes = services::load_close_prices(prices)?;

    if let Some(symbol) = symbol {
        holdings.retain(|h| h.symbol == symbol);
        closes.retain(|c| c.symbol == symbol);
    }

    let joined = services::join_with_prices(&holdings, &closes);
    if joined.is_empty() {
        println!("\n⚠️  No shareholding rows line up with a close price.");
        return Ok(());
    }
    println!(
        "\n🔗 {} of {} shareholding rows matched a close on their position date",
        joined.len(),
        holdings.len()
    );

    let results = services::correlate_participants(&joined, max_p_value)?;
    let mut current_symbol = "";

    for row in &results {
        if row.symbol != current_symbol {
            current_symbol = &row.symbol;
            println!("\n═══════════════════════════════════════════════════════════\n");
            println!("🔹 {}", row.symbol);
        }
        println!("{}", format_row(row));
    }

    let significant = results.iter().filter(|r| r.can_reject_null_hypothesis).count();
    println!("\n═══════════════════════════════════════════════════════════\n");
    println!(
        "✅ {} of {} participants correlate at p <= {}",
        significant,
        results.len(),
        max_p_value
    );

    Ok(())
}

fn format_row(row: &ParticipantCorrelation) -> String {
    let marker = match row.money_class {
        MoneyClass::Smart => "💰",
        MoneyClass::Dumb => "🎲",
        MoneyClass::Other => "  ",
    };
    let stats = match (row.spearman_correlation, row.p_value) {
        (Some(rho), Some(p)) => format!("rho {:>7.4}  p {:.4}", rho, p),
        _ => "rho     n/a  p    n/a".to_string(),
    };
    let flag = if row.can_reject_null_hypothesis { " *" } else { "" };

    format!(
        "   {} {:<8} {:<40} avg {:>16.0}  n {:>4}  {}{}",
        marker,
        row.participant_id,
        truncate(&row.participant_name, 40),
        row.average_shareholding_amount,
        row.observations,
        stats,
        flag
    )
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars - 1).chain(std::iter::once('…')).collect()
    }
}
