//! CLI entry point for the house sale cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use house_processing::{CleaningConfig, CleaningSummary, process_file};
use std::path::Path;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Impute missing values and remove outliers from raw house sale data",
    long_about = "Cleans a raw house sale CSV for model training.\n\n\
                  Numeric columns are filled with their median, text and boolean\n\
                  columns with their most frequent value. Rows an isolation forest\n\
                  flags as anomalous on the outlier columns are then removed.\n\n\
                  EXAMPLES:\n  \
                  # Default paths and settings\n  \
                  house-processing\n\n  \
                  # Screen price and sqft, remove about 2% of rows\n  \
                  house-processing --outlier-columns price,sqft --contamination 0.02\n\n  \
                  # Machine-readable summary\n  \
                  house-processing -i raw.csv -o cleaned.csv --json"
)]
struct Args {
    /// Path to the raw CSV file
    #[arg(short, long, default_value = "data/raw/house_data.csv")]
    input: String,

    /// Path of the cleaned CSV to write (parent directories are created)
    #[arg(short, long, default_value = "data/processed/cleaned_house_data.csv")]
    output: String,

    /// Expected fraction of outlier rows, in (0.0, 0.5]
    #[arg(long, default_value = "0.05")]
    contamination: f64,

    /// Columns screened for outliers
    #[arg(long, value_delimiter = ',', default_value = "price")]
    outlier_columns: Vec<String>,

    /// Seed for the isolation forest
    #[arg(long, default_value = "42")]
    random_state: u64,

    /// Number of isolation trees
    #[arg(long, default_value = "100")]
    n_estimators: usize,

    /// Rows sampled per tree
    #[arg(long, default_value = "256")]
    max_samples: usize,

    /// Only impute missing values; keep every row
    #[arg(long)]
    keep_outliers: bool,

    /// Print the cleaning summary as JSON to stdout
    ///
    /// Disables all logs so stdout carries only JSON.
    #[arg(long)]
    json: bool,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = CleaningConfig::builder()
        .outlier_columns(args.outlier_columns.iter().map(|c| c.trim().to_string()))
        .contamination(args.contamination)
        .remove_outliers(!args.keep_outliers)
        .random_state(args.random_state)
        .n_estimators(args.n_estimators)
        .max_samples(args.max_samples)
        .build()?;

    info!("Cleaning {} -> {}", args.input, args.output);

    let summary = match process_file(&args.input, &args.output, &config) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Cleaning failed: {}", e);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            return Err(anyhow!("Cleaning failed: {}", e));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_human_readable_summary(&summary, &args);
    Ok(())
}

/// Print a human-readable summary of the cleaning run.
fn print_human_readable_summary(summary: &CleaningSummary, args: &Args) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input, summary.rows_before, summary.columns
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        args.output, summary.rows_after, summary.columns
    );
    println!();
    println!("Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!("  Missing values filled: {}", summary.missing_before);
    println!(
        "  Rows: {} -> {} ({} removed)",
        summary.rows_before, summary.rows_after, summary.rows_removed
    );
    println!();

    if !summary.processing_steps.is_empty() {
        println!("Actions Taken:");
        for step in &summary.processing_steps {
            println!("  - {}", step);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
