//! Command line entry point: prints the original and the optimized query.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flexi_logger::Logger;

use joinorder_sql::catalog::Settings;
use joinorder_sql::{optimize_sql, Strategy};

#[derive(Parser, Debug)]
#[clap(version, about = "Cost based join order optimizer")]
struct Cli {
    /// YAML file with table row counts and optimizer settings.
    #[clap(short, long)]
    settings: Option<PathBuf>,
    /// Join smallest relations first instead of searching.
    #[clap(long)]
    heuristic: bool,
    /// Print the join tree of the optimized plan.
    #[clap(long)]
    explain: bool,
    /// Log level, overridden by RUST_LOG.
    #[clap(long, default_value = "warn")]
    log_level: String,
    /// Query to optimize.
    sql: String,
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    match path {
        Some(path) => {
            let yaml = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file: {:?}", path))?;
            Settings::from_yaml(&yaml)
                .with_context(|| format!("Failed to load settings from file: {:?}", path))
        }
        None => Ok(Settings::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _logger = Logger::try_with_env_or_str(&cli.log_level)?
        .log_to_stderr()
        .start()?;

    let settings = load_settings(cli.settings.as_ref())?;
    let strategy = if cli.heuristic {
        Strategy::Heuristic
    } else {
        Strategy::CostBased
    };

    let optimized = optimize_sql(&cli.sql, &settings, strategy)?;

    println!("Original Query: {}", cli.sql.trim());
    println!("Optimized Query: {}", optimized.rendered);
    println!("Estimated Cost: {}", optimized.plan.cost());
    if cli.explain {
        print!("{}", optimized.explain()?);
    }

    Ok(())
}
