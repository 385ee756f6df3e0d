//! CLI entry point for the NPMRDS LOTTR tool.
//!
//! Provides subcommands for computing per-segment travel-time reliability
//! ratios from a measurement export and for annotating a measurement file
//! with the derived NHPP periods.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use npmrds_lottr::analyzers::analyzer::{analyze, classify_file};
use npmrds_lottr::output::print_json;
use npmrds_lottr::periods::NhppPeriod;
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "npmrds_lottr")]
#[command(about = "Travel-time reliability (LOTTR) metrics from NPMRDS probe data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-segment LOTTR ratios from a measurement CSV
    Compute {
        /// Path to the NPMRDS measurement CSV
        #[arg(value_name = "MEASUREMENTS")]
        input: String,

        /// CSV file to write the per-segment summary to
        #[arg(short, long, default_value = "lottr.csv")]
        output: String,

        /// Analysis periods to report, by index (1-4; 0 is the off-period)
        #[arg(short, long, value_delimiter = ',', default_values_t = vec![1u8, 2, 3, 4])]
        periods: Vec<u8>,

        /// Also log the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Annotate each measurement row with its day type and NHPP period
    Classify {
        /// Path to the NPMRDS measurement CSV
        #[arg(value_name = "MEASUREMENTS")]
        input: String,

        /// CSV file to write the annotated rows to
        #[arg(short, long, default_value = "classified.csv")]
        output: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/npmrds_lottr.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("npmrds_lottr.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            input,
            output,
            periods,
            json,
        } => {
            let periods = parse_periods(&periods)?;
            let report = analyze(&input, &output, &periods)?;
            if json {
                print_json(&report)?;
            }
        }
        Commands::Classify { input, output } => {
            let (written, skipped) = classify_file(&input, &output)?;
            info!(written, skipped, output = %output, "Classification complete");
        }
    }

    Ok(())
}

/// Resolves period indices from the command line into [`NhppPeriod`]s.
fn parse_periods(indices: &[u8]) -> Result<Vec<NhppPeriod>> {
    let mut periods = Vec::with_capacity(indices.len());
    for &index in indices {
        match NhppPeriod::from_index(index) {
            Some(period) => periods.push(period),
            None => bail!("unknown analysis period index {index} (expected 0-4)"),
        }
    }
    Ok(periods)
}
