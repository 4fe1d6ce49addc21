//! CLI entry point for the tabular preprocessing pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tabprep::profiler::DataProfiler;
use tabprep::{
    DataCleaner, EncodingMethod, MissingValueTechnique, OutlierRemoval, Pipeline, PipelineConfig,
    PipelineResult,
};
use tracing::{error, info};

/// CLI-compatible missing value technique enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingValueTechnique {
    /// Drop every row with a missing value
    Drop,
    /// Fill numeric columns with their mean
    FillMean,
    /// Fill numeric columns with their median
    FillMedian,
    /// Fill every column with its most frequent value
    FillMode,
}

impl From<CliMissingValueTechnique> for MissingValueTechnique {
    fn from(cli: CliMissingValueTechnique) -> Self {
        match cli {
            CliMissingValueTechnique::Drop => MissingValueTechnique::Drop,
            CliMissingValueTechnique::FillMean => MissingValueTechnique::FillMean,
            CliMissingValueTechnique::FillMedian => MissingValueTechnique::FillMedian,
            CliMissingValueTechnique::FillMode => MissingValueTechnique::FillMode,
        }
    }
}

/// CLI-compatible outlier removal enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierRemoval {
    /// Keep outliers as-is
    None,
    /// Z-score pass over one column (rows are kept)
    Zscore,
    /// Remove rows outside the IQR bounds of any numeric column
    Iqr,
}

impl From<CliOutlierRemoval> for OutlierRemoval {
    fn from(cli: CliOutlierRemoval) -> Self {
        match cli {
            CliOutlierRemoval::None => OutlierRemoval::None,
            CliOutlierRemoval::Zscore => OutlierRemoval::ZScore,
            CliOutlierRemoval::Iqr => OutlierRemoval::Iqr,
        }
    }
}

/// CLI-compatible encoding method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEncodingMethod {
    /// Integer code per category
    Label,
    /// One indicator column per category
    OneHot,
}

impl From<CliEncodingMethod> for EncodingMethod {
    fn from(cli: CliEncodingMethod) -> Self {
        match cli {
            CliEncodingMethod::Label => EncodingMethod::LabelEncoding,
            CliEncodingMethod::OneHot => EncodingMethod::OneHotEncoding,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular Data Preprocessing Pipeline",
    long_about = "Prepare a CSV table for a classifier: drop columns, handle missing values,\n\
                  check and remove outliers, encode categorical columns and score a\n\
                  logistic-regression baseline.\n\n\
                  EXAMPLES:\n  \
                  # Inspect a dataset\n  \
                  tabprep -i titanic.csv --info\n\n  \
                  # Fill missing values, remove outliers, encode and evaluate\n  \
                  tabprep -i titanic.csv --drop Name,Ticket,Cabin --missing fill-mode \\\n    \
                  --outliers iqr --encode Sex,Embarked --target Survived -o prepared.csv\n\n  \
                  # Use a JSON configuration file\n  \
                  tabprep -i titanic.csv --config pipeline.json --json"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file with a pipeline configuration
    ///
    /// Flags given on the command line override values from the file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the dataset profile and missing value counts, then exit
    #[arg(long)]
    info: bool,

    /// Write the processed table to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Columns to drop before processing (comma-separated)
    #[arg(long, value_delimiter = ',')]
    drop: Vec<String>,

    /// Technique for handling missing values
    #[arg(long, value_enum)]
    missing: Option<CliMissingValueTechnique>,

    /// Outlier removal method
    #[arg(long, value_enum)]
    outliers: Option<CliOutlierRemoval>,

    /// Column for the z-score pass (defaults to the first column)
    #[arg(long)]
    zscore_column: Option<String>,

    /// Columns to encode (comma-separated)
    #[arg(long, value_delimiter = ',')]
    encode: Vec<String>,

    /// Encoding method for --encode
    #[arg(long, value_enum)]
    encode_method: Option<CliEncodingMethod>,

    /// Target column; enables the train/test split and the baseline model
    #[arg(short, long)]
    target: Option<String>,

    /// Fraction of rows in the test partition (0.0 - 1.0)
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Seed for the train/test split
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the run summary as JSON to stdout
    ///
    /// Disables all progress logs; only outputs the JSON summary.
    #[arg(long)]
    json: bool,
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

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    info!("Loading dataset from: {}", args.input.display());
    let data = load_csv(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    if args.info {
        return print_info(&args, &data);
    }

    let config = build_config(&args)?;
    let pipeline = Pipeline::builder().config(config).build()?;

    let result = pipeline.process(&data).map_err(|e| {
        error!("Pipeline failed: {}", e);
        anyhow!("Pipeline failed: {}", e)
    })?;

    if let Some(ref path) = args.output {
        write_csv(&result.data, path)?;
        info!("Processed dataset saved: {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.summary)?);
        return Ok(());
    }

    print_summary(&result, &args);
    Ok(())
}

/// Merge the optional JSON configuration file with command-line flags.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<PipelineConfig>(&content)
                .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?
        }
        None => PipelineConfig::default(),
    };

    if !args.drop.is_empty() {
        config.columns_to_drop = args.drop.clone();
    }
    if let Some(technique) = args.missing {
        config.missing_value_technique = Some(technique.into());
    }
    if let Some(method) = args.outliers {
        config.outlier_removal = method.into();
    }
    if let Some(ref column) = args.zscore_column {
        config.zscore_column = Some(column.clone());
    }
    if !args.encode.is_empty() {
        config.encode_columns = args.encode.clone();
    }
    if let Some(method) = args.encode_method {
        config.encode_method = method.into();
    }
    if let Some(ref target) = args.target {
        config.target_column = Some(target.clone());
    }
    if let Some(fraction) = args.test_fraction {
        config.split.test_fraction = fraction;
    }
    if let Some(seed) = args.seed {
        config.split.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

/// Print the dataset profile.
///
/// Uses `println!` on purpose: this output is the point of `--info` and must
/// show regardless of the log level.
fn print_info(args: &Args, data: &DataFrame) -> Result<()> {
    let profile = DataProfiler::profile(data)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DATA INFORMATION");
    println!("{}\n", "=".repeat(80));

    println!("  File: {}", args.input.display());
    println!("  Rows: {}", profile.shape.0);
    println!("  Columns: {}", profile.shape.1);
    println!();

    println!(
        "{:<20} {:<10} {:<10} {:<10} {:>12} {:>12}",
        "Column", "Type", "Missing", "Unique", "Mean", "Std"
    );
    println!("{}", "-".repeat(80));

    for col in &profile.column_profiles {
        let (mean, std) = col
            .numeric_summary
            .as_ref()
            .map(|s| (format!("{:.3}", s.mean), format!("{:.3}", s.std)))
            .unwrap_or_default();
        println!(
            "{:<20} {:<10} {:<10} {:<10} {:>12} {:>12}",
            truncate_str(&col.name, 19),
            col.dtype,
            col.null_count,
            col.unique_count,
            mean,
            std
        );
    }
    println!();

    println!("MISSING VALUES");
    println!("{}", "-".repeat(40));
    if !DataCleaner::has_missing_values(data) {
        println!("  No missing values");
    } else {
        for (column, count) in DataCleaner::missing_value_counts(data) {
            if count > 0 {
                println!("  {:<20} {}", truncate_str(&column, 19), count);
            }
        }
    }
    println!();

    Ok(())
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Print a human-readable summary of the run.
fn print_summary(result: &PipelineResult, args: &Args) {
    let summary = &result.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("PREPROCESSING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input.display(),
        summary.rows_before,
        summary.columns_before
    );
    match &args.output {
        Some(path) => println!(
            "Output: {} ({} rows x {} columns)",
            path.display(),
            summary.rows_after,
            summary.columns_after
        ),
        None => println!(
            "Output: {} rows x {} columns (not written, use --output)",
            summary.rows_after, summary.columns_after
        ),
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed()
    );
    let missing_before: usize = summary.missing_before.iter().map(|(_, n)| n).sum();
    let missing_after: usize = summary.missing_after.iter().map(|(_, n)| n).sum();
    println!("  Missing values: {} -> {}", missing_before, missing_after);
    if let Some((train, test)) = summary.split_sizes {
        println!("  Split: {} train / {} test rows", train, test);
    }
    if let Some(accuracy) = summary.accuracy {
        println!("  Baseline accuracy: {:.2}%", accuracy * 100.0);
    }
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

fn load_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))
}

fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    let mut output = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut output)?;
    Ok(())
}
