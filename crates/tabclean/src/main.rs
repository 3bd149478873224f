//! CLI entry point for the tabular cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabclean::io::{CsvDirectorySource, CsvSink, DataSink, DataSource, read_csv};
use tabclean::{
    CleaningConfig, CleaningPipeline, CleaningReport, ColumnStatistics, DataProfiler, Dataset,
    DatasetProfile, ImputationStrategy, TransformKind,
};
use tracing::{error, info};

/// CLI-compatible imputation strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliImputation {
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    Median,
}

impl From<CliImputation> for ImputationStrategy {
    fn from(cli: CliImputation) -> Self {
        match cli {
            CliImputation::Mean => ImputationStrategy::Mean,
            CliImputation::Median => ImputationStrategy::Median,
        }
    }
}

/// CLI-compatible transformation enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTransform {
    /// ln(1 + x)
    Log,
    /// sqrt(x)
    Sqrt,
    /// Shifted Box-Cox with lambda 0.15
    Boxcox,
}

impl From<CliTransform> for TransformKind {
    fn from(cli: CliTransform) -> Self {
        match cli {
            CliTransform::Log => TransformKind::Log,
            CliTransform::Sqrt => TransformKind::Sqrt,
            CliTransform::Boxcox => TransformKind::BoxCox,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular data cleaning pipeline",
    long_about = "Profiles a CSV dataset, then coerces types, strips symbols, imputes \
                  missing values, removes outliers and reduces skew.\n\n\
                  EXAMPLES:\n  \
                  # Profile only\n  \
                  tabclean -i loans.csv --describe\n\n  \
                  # Clean with a JSON config and write the result\n  \
                  tabclean -i loans.csv --config clean.json -o loans_clean.csv\n\n  \
                  # Read table 'loans' from a directory of CSV files\n  \
                  tabclean -i data/ --table loans --outliers annual_inc --skew annual_inc"
)]
struct Args {
    /// CSV file to clean, or a directory of CSV files when --table is given
    #[arg(short, long)]
    input: PathBuf,

    /// Table to read from the input directory
    #[arg(short, long)]
    table: Option<String>,

    /// Where to write the cleaned CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with a cleaning configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Columns to drop
    #[arg(long, value_delimiter = ',')]
    drop: Vec<String>,

    /// Columns to strip symbols from
    #[arg(long, value_delimiter = ',')]
    symbol_columns: Vec<String>,

    /// Literal symbols to strip, in order (repeat the flag for each symbol)
    #[arg(long = "symbol")]
    symbols: Vec<String>,

    /// Columns to convert to numeric
    #[arg(long, value_delimiter = ',')]
    numeric: Vec<String>,

    /// Columns to convert to datetime
    #[arg(long, value_delimiter = ',')]
    datetime: Vec<String>,

    /// chrono format for datetime columns (auto-detected when omitted)
    #[arg(long)]
    date_format: Option<String>,

    /// Columns to convert to categorical
    #[arg(long, value_delimiter = ',')]
    categorical: Vec<String>,

    /// Impute missing numeric values
    #[arg(long, value_enum)]
    impute: Option<CliImputation>,

    /// Columns to remove outliers from, in order
    #[arg(long, value_delimiter = ',')]
    outliers: Vec<String>,

    /// Standardized-score threshold for outlier removal
    #[arg(short = 'z', long)]
    z_threshold: Option<f64>,

    /// Columns to reduce skew in
    #[arg(long, value_delimiter = ',')]
    skew: Vec<String>,

    /// Transformations to try, in preference order
    #[arg(long, value_enum, value_delimiter = ',')]
    transforms: Vec<CliTransform>,

    /// Print the dataset profile and exit
    #[arg(long)]
    describe: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs; only the final JSON is written.
    #[arg(long)]
    json: bool,

    /// Write the JSON report to this file
    #[arg(short = 'r', long)]
    report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct RunReport<'a> {
    input: String,
    output: Option<String>,
    shape_before: (usize, usize),
    shape_after: (usize, usize),
    profile: &'a DatasetProfile,
    report: &'a CleaningReport,
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
    // .env may carry RUST_LOG, so load it before logging is configured
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let dataset = load_dataset(&args)?;

    if args.describe {
        let profile = DataProfiler::profile(&dataset)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&profile)?);
        } else {
            print_profile(&profile);
        }
        return Ok(());
    }

    let config = build_config(&args)?;
    let pipeline = CleaningPipeline::builder().config(config).build()?;

    let shape_before = dataset.shape();
    let result = pipeline.process(dataset).map_err(|e| {
        error!("Pipeline failed: {}", e);
        anyhow!("Pipeline failed: {}", e)
    })?;

    if let Some(output) = &args.output {
        CsvSink::new()
            .write(&result.dataset, output)
            .with_context(|| format!("Could not write {}", output.display()))?;
    }

    let run = RunReport {
        input: args.input.display().to_string(),
        output: args.output.as_ref().map(|p| p.display().to_string()),
        shape_before,
        shape_after: result.dataset.shape(),
        profile: &result.profile,
        report: &result.report,
    };

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&run)?)?;
        info!("Report written to: {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_summary(&run);
    }

    Ok(())
}

fn load_dataset(args: &Args) -> Result<Dataset> {
    match &args.table {
        Some(table) => {
            let source = CsvDirectorySource::new(&args.input);
            let handle = source.connect()?;
            info!("Querying table '{}' from {}", table, args.input.display());
            Ok(source.query(&handle, table)?)
        }
        None => {
            if !args.input.is_file() {
                return Err(anyhow!("Input file not found: {}", args.input.display()));
            }
            Ok(read_csv(&args.input)?)
        }
    }
}

/// Merge the optional JSON config file with command line overrides.
fn build_config(args: &Args) -> Result<CleaningConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => CleaningConfig::default(),
    };

    let override_list = |target: &mut Vec<String>, values: &[String]| {
        if !values.is_empty() {
            *target = values.to_vec();
        }
    };
    override_list(&mut config.drop_columns, &args.drop);
    override_list(&mut config.symbol_columns, &args.symbol_columns);
    override_list(&mut config.symbols, &args.symbols);
    override_list(&mut config.numeric_columns, &args.numeric);
    override_list(&mut config.datetime_columns, &args.datetime);
    override_list(&mut config.categorical_columns, &args.categorical);
    override_list(&mut config.outlier_columns, &args.outliers);
    override_list(&mut config.skew_columns, &args.skew);

    if let Some(format) = &args.date_format {
        config.date_format = Some(format.clone());
    }
    if let Some(strategy) = args.impute {
        config.imputation = Some(strategy.into());
    }
    if let Some(threshold) = args.z_threshold {
        config.z_threshold = threshold;
    }
    if !args.transforms.is_empty() {
        config.transformations = args.transforms.iter().map(|t| (*t).into()).collect();
    }

    config.validate()?;
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<CleaningConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read config {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid config {}", path.display()))
}

/// Print the profile as tables.
///
/// This uses `println!` on purpose: it is the command's output, not a log.
fn print_profile(profile: &DatasetProfile) {
    println!("\n{}", "=".repeat(80));
    println!("DATASET PROFILE");
    println!("{}\n", "=".repeat(80));
    println!("  Rows: {}", profile.shape.0);
    println!("  Columns: {}", profile.shape.1);
    println!();

    println!(
        "{:<24} {:<12} {:>8} {:>10} {:>10}",
        "Column", "Type", "Count", "Missing", "Missing %"
    );
    println!("{}", "-".repeat(68));
    for (desc, nulls) in profile.description.iter().zip(&profile.null_info) {
        println!(
            "{:<24} {:<12} {:>8} {:>10} {:>10.1}",
            truncate_str(&desc.column, 23),
            desc.logical_type,
            desc.statistics.count(),
            nulls.null_count,
            nulls.null_percentage
        );
    }
    println!();

    println!("NUMERIC COLUMNS");
    println!("{}", "-".repeat(40));
    for desc in &profile.description {
        if let ColumnStatistics::Numeric {
            mean,
            std,
            min,
            q50,
            max,
            ..
        } = &desc.statistics
        {
            println!(
                "  {:<22} mean={} std={} min={} median={} max={}",
                truncate_str(&desc.column, 21),
                fmt_opt(*mean),
                fmt_opt(*std),
                fmt_opt(*min),
                fmt_opt(*q50),
                fmt_opt(*max)
            );
        }
    }
    println!();

    if !profile.distinct_counts.is_empty() {
        println!("DISTINCT VALUES");
        println!("{}", "-".repeat(40));
        for (column, count) in &profile.distinct_counts {
            println!("  {:<22} {}", truncate_str(column, 21), count);
        }
        println!();
    }
}

fn print_summary(run: &RunReport<'_>) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Input:  {} ({} rows x {} columns)",
        run.input, run.shape_before.0, run.shape_before.1
    );
    if let Some(output) = &run.output {
        println!(
            "Output: {} ({} rows x {} columns)",
            output, run.shape_after.0, run.shape_after.1
        );
    }
    println!();

    println!("Operations:");
    for op in &run.report.operations {
        println!(
            "  {:<24} {} columns, rows {} -> {}",
            op.operation.display_name(),
            op.outcomes.len(),
            op.rows_before,
            op.rows_after
        );
    }

    if !run.report.skew_selections.is_empty() {
        println!();
        println!("Skew reduction:");
        for selection in &run.report.skew_selections {
            println!(
                "  {:<22} {:<7} {:.3} -> {:.3}",
                truncate_str(&selection.column, 21),
                selection.chosen,
                selection.skewness_before,
                selection.skewness_after
            );
        }
    }

    let issues = run.report.issues();
    if !issues.is_empty() {
        println!();
        println!("Issues ({}):", issues.len());
        for (operation, outcome) in issues {
            println!(
                "  [{:?}] {} / {}: {}",
                outcome.status,
                operation.display_name(),
                outcome.column,
                outcome.message
            );
        }
    }
    println!();
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
