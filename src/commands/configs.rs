use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_TRIGGER_RATIOS, DEFAULT_WINDOW_END, DEFAULT_WINDOW_START};
use crate::error::Result;
use crate::models::generate_configs;
use crate::services;
use crate::utils::{default_config_path, parse_ratio_list, parse_timestamp};

pub fn run(from: Option<String>, to: Option<String>, ratios: Option<String>, output: Option<PathBuf>) {
    let from = from.unwrap_or_else(|| DEFAULT_WINDOW_START.to_string());
    let to = to.unwrap_or_else(|| DEFAULT_WINDOW_END.to_string());
    let output = output.unwrap_or_else(default_config_path);

    match write_configs(&from, &to, ratios.as_deref(), &output) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn write_configs(from: &str, to: &str, ratios: Option<&str>, output: &Path) -> Result<()> {
    let range_start = parse_timestamp(from)?;
    let range_end = parse_timestamp(to)?;
    let ratios = match ratios {
        Some(list) => parse_ratio_list(list)?,
        None => DEFAULT_TRIGGER_RATIOS.to_vec(),
    };

    let configs = generate_configs(range_start, range_end, &ratios)?;

    println!("⚙️  Trend configs\n");
    for config in &configs {
        println!("   {:<32} {}", config.config_id(), config.display_name());
    }

    let written = services::write_trend_configs(output, &configs)?;
    println!("\n💾 Wrote {} configs to {}", written, output.display());

    Ok(())
}
