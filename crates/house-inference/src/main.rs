//! CLI entry point for house price prediction.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use house_inference::{Predictor, PredictorConfig, RawHouseRecord};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Input file format
#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    /// A JSON object or an array of objects
    Json,
    /// A CSV file with one house per row
    Csv,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Predict house prices from a trained model",
    long_about = "Encodes house records with the onehot-v1 feature scheme and runs them\n\
                  through a trained model artifact.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  HOUSE_MODEL_PATH    Model artifact used when --model is not given\n\n\
                  EXAMPLES:\n  \
                  # Single prediction with confidence band\n  \
                  house-predict --input request.json --reference-year 2025\n\n  \
                  # Raw predictions for every row of a CSV\n  \
                  house-predict --input houses.csv --batch"
)]
struct Args {
    /// Path to the model artifact
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Path to the request file (.json or .csv)
    #[arg(short, long)]
    input: PathBuf,

    /// Input format (inferred from the extension when omitted)
    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    /// Print raw predictions for all records instead of full responses
    #[arg(long)]
    batch: bool,

    /// Year used to compute house age (defaults to the current year)
    #[arg(long)]
    reference_year: Option<i32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so stdout carries only JSON.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    // Load environment variables from .env file
    dotenv().ok();

    let mut builder = PredictorConfig::builder();
    builder = match args.model {
        Some(ref path) => builder.model_path(path),
        None => builder.model_path(PredictorConfig::from_env().model_path),
    };
    if let Some(year) = args.reference_year {
        builder = builder.reference_year(year);
    }
    let config = builder.build()?;

    let predictor = Predictor::load(&config);
    if !predictor.is_available() {
        error!("No usable model at {}", config.model_path.display());
    }

    let records = read_records(&args.input, args.format)?;
    info!("Read {} records from {}", records.len(), args.input.display());

    if args.batch {
        let prices = predictor.batch_predict(&records).map_err(report)?;
        println!("{}", serde_json::to_string_pretty(&prices)?);
        return Ok(());
    }

    let responses = records
        .iter()
        .map(|record| predictor.predict_price(record))
        .collect::<house_inference::Result<Vec<_>>>()
        .map_err(report)?;

    if responses.len() == 1 {
        println!("{}", serde_json::to_string_pretty(&responses[0])?);
    } else {
        println!("{}", serde_json::to_string_pretty(&responses)?);
    }
    Ok(())
}

/// Print the error as `{code, message}` JSON on stdout and turn it into an
/// `anyhow` error for the exit status.
fn report(e: house_inference::InferenceError) -> anyhow::Error {
    if let Ok(json) = serde_json::to_string_pretty(&e) {
        println!("{}", json);
    }
    anyhow!("Prediction failed: {}", e)
}

fn read_records(path: &Path, format: Option<InputFormat>) -> Result<Vec<RawHouseRecord>> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }

    let format = match format {
        Some(format) => format,
        None => match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Csv,
            _ => InputFormat::Json,
        },
    };

    match format {
        InputFormat::Json => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            let records = if value.is_array() {
                serde_json::from_value(value)?
            } else {
                vec![serde_json::from_value(value)?]
            };
            Ok(records)
        }
        InputFormat::Csv => {
            let df = CsvReadOptions::default()
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path.to_path_buf()))?
                .finish()
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(RawHouseRecord::from_dataframe(&df)?)
        }
    }
}
