use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "stock-trend")]
#[command(about = "UP/FLAT/DOWN trend segmentation for stock price history", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Segment every (symbol, config) pair and write the trend table
    Segment {
        /// Price table (default: $TREND_DATA_DIR/stock_prices.csv)
        #[arg(short, long)]
        prices: Option<PathBuf>,

        /// Trend config table (default: $TREND_DATA_DIR/stock_trend_config.csv)
        #[arg(short, long)]
        configs: Option<PathBuf>,

        /// Output segment table (default: $TREND_DATA_DIR/stock_trend.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only segment these symbols (comma-separated)
        #[arg(short, long)]
        symbols: Option<String>,

        /// Evaluate pairs one at a time instead of on the thread pool
        #[arg(long)]
        sequential: bool,
    },
    /// Generate a trend config table, one config per trigger ratio
    Configs {
        /// Window start (default: 2018-01-01)
        #[arg(long)]
        from: Option<String>,

        /// Window end (default: 2025-05-02)
        #[arg(long)]
        to: Option<String>,

        /// Trigger ratios, comma-separated (default: 0.3,0.5,0.7)
        #[arg(short, long)]
        ratios: Option<String>,

        /// Output config table (default: $TREND_DATA_DIR/stock_trend_config.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show window min/max and breakout thresholds per (symbol, config)
    Summary {
        #[arg(short, long)]
        prices: Option<PathBuf>,

        #[arg(short, long)]
        configs: Option<PathBuf>,

        /// Only this symbol
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Print rows of a segment table
    Show {
        /// Segment table (default: $TREND_DATA_DIR/stock_trend.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Symbols to keep (comma-separated)
        #[arg(short, long)]
        symbols: Option<String>,

        /// Config id to keep
        #[arg(short, long)]
        config: Option<String>,

        /// Trend label to keep: up, down or flat
        #[arg(short, long)]
        trend: Option<String>,

        /// Print JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
    /// Correlate CCASS participant holdings with the close price
    Correlate {
        /// CCASS shareholding table
        #[arg(long)]
        shareholding: PathBuf,

        /// Daily close table
        #[arg(long)]
        prices: PathBuf,

        /// Significance level: 0.001, 0.01 or 0.05 (default: 0.05)
        #[arg(long)]
        max_p_value: Option<f64>,

        /// Only this symbol
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Segment {
            prices,
            configs,
            output,
            symbols,
            sequential,
        } => {
            commands::segment::run(prices, configs, output, symbols, sequential);
        }
        Commands::Configs {
            from,
            to,
            ratios,
            output,
        } => {
            commands::configs::run(from, to, ratios, output);
        }
        Commands::Summary {
            prices,
            configs,
            symbol,
        } => {
            commands::summary::run(prices, configs, symbol);
        }
        Commands::Show {
            input,
            symbols,
            config,
            trend,
            json,
        } => {
            commands::show::run(input, symbols, config, trend, json);
        }
        Commands::Correlate {
            shareholding,
            prices,
            max_p_value,
            symbol,
        } => {
            commands::correlate::run(shareholding, prices, max_p_value, symbol);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_segment_flags() {
        let cli = Cli::parse_from(["stock-trend", "segment", "--sequential", "-s", "SEHK:00001"]);
        match cli.command {
            Commands::Segment {
                sequential, symbols, ..
            } => {
                assert!(sequential);
                assert_eq!(symbols.as_deref(), Some("SEHK:00001"));
            }
            _ => panic!("expected segment"),
        }
    }

    #[test]
    fn test_correlate_requires_inputs() {
        assert!(Cli::try_parse_from(["stock-trend", "correlate"]).is_err());
        let cli = Cli::try_parse_from([
            "stock-trend",
            "correlate",
            "--shareholding",
            "ccass.csv",
            "--prices",
            "close.csv",
            "--max-p-value",
            "0.01",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Correlate { max_p_value: Some(p), .. } if p == 0.01
        ));
    }
}
