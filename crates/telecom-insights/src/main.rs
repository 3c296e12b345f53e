//! CLI entry point for the telecommunications insights dashboard.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use polars::prelude::*;
use std::path::Path;
use telecom_insights::{
    AnalysisConfig, CsvLoader, DashboardReport, DatasetLoader, NonNumericPolicy, ReportGenerator,
    table_to_json_rows,
};
use tracing::{error, info};

#[cfg(feature = "sqlite")]
use telecom_insights::{QueryExecutor, QueryParam, SqliteExecutor};

const BAR_WIDTH: usize = 40;

/// CLI-compatible non-numeric policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNonNumericPolicy {
    /// Skip values that are not numbers
    Skip,
    /// Fail when a value is not a number
    Strict,
}

impl From<CliNonNumericPolicy> for NonNumericPolicy {
    fn from(cli: CliNonNumericPolicy) -> Self {
        match cli {
            CliNonNumericPolicy::Skip => NonNumericPolicy::Skip,
            CliNonNumericPolicy::Strict => NonNumericPolicy::Strict,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Telecommunications Data Insights",
    long_about = "Analyze customer data, churn trends, and more.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  TELECOM_DATASET     Default dataset path (CSV)\n  \
                  TELECOM_DATABASE    Default SQLite database path\n\n\
                  EXAMPLES:\n  \
                  # Dashboard for a dataset\n  \
                  telecom-insights -i telecommunications_data.csv\n\n  \
                  # Machine-readable output\n  \
                  telecom-insights -i data.csv --json\n\n  \
                  # Query the database with a bound parameter\n  \
                  telecom-insights -i data.csv --db telecom_data.db \\\n    \
                  --query \"SELECT * FROM customers WHERE PlanType = ?1 LIMIT 5\" --param Basic"
)]
struct Args {
    /// Path to the CSV dataset (defaults to $TELECOM_DATASET)
    #[arg(short, long)]
    input: Option<String>,

    /// Output directory for emitted reports [default: output]
    #[arg(short, long)]
    output: Option<String>,

    /// Number of rows shown in the dataset preview
    #[arg(long, default_value = "5")]
    preview_rows: usize,

    /// Customer identifier column (duplicate detection)
    #[arg(long)]
    key_column: Option<String>,

    /// Churn flag column
    #[arg(long)]
    churn_column: Option<String>,

    /// Plan column used for grouping
    #[arg(long)]
    plan_column: Option<String>,

    /// Monthly charges column
    #[arg(long)]
    charges_column: Option<String>,

    /// Usage minutes column (scatter x axis)
    #[arg(long)]
    usage_column: Option<String>,

    /// Data used column (scatter y axis)
    #[arg(long)]
    data_column: Option<String>,

    /// How numeric metrics treat values that are not numbers
    #[arg(long, value_enum, default_value = "skip")]
    non_numeric: CliNonNumericPolicy,

    /// Leave missing values out of the churn rate instead of counting them
    #[arg(long)]
    exclude_missing_category: bool,

    /// SQL query to run against the database (read-only)
    #[arg(long)]
    query: Option<String>,

    /// Positional query parameter bound to ?1, ?2, ... (repeatable)
    #[arg(long = "param")]
    params: Vec<String>,

    /// SQLite database path (defaults to $TELECOM_DATABASE)
    #[arg(long)]
    db: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable dashboard
    ///
    /// Disables all logs; only outputs the final JSON document.
    #[arg(long)]
    json: bool,

    /// Write the dashboard report as JSON to the output directory
    ///
    /// The report will be saved as <input_name>_dashboard.json
    #[arg(short = 'r', long)]
    emit_report: bool,
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

    let config = build_config(&args)?;
    let input = config.dataset_path.clone();

    let data = CsvLoader::new().load(&input)?;
    let source = input.display().to_string();

    let report = match ReportGenerator::build_dashboard_report(&data, &source, &config) {
        Ok(report) => report,
        Err(e) => {
            error!("Analysis failed: {}", e);
            return Err(anyhow!("Analysis failed: {}", e));
        }
    };

    if args.emit_report {
        let generator = ReportGenerator::from_config(&config);
        let report_path = generator.write_report_to_file(&report, &extract_file_stem(&input))?;
        info!("Report written to: {}", report_path.display());
    }

    let query_result = match args.query.as_deref() {
        Some(query) => Some(run_query(&config.database_path, query, &args.params)?),
        None => None,
    };

    if args.json {
        let mut document = serde_json::json!({ "dashboard": report });
        if let Some(ref result) = query_result {
            document["query_result"] = serde_json::Value::Array(table_to_json_rows(result)?);
        }
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    print_dashboard(&report);

    if let Some(ref result) = query_result {
        println!("QUERY RESULTS");
        println!("{}", "-".repeat(40));
        println!("{}", result);
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the dashboard report");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Merge CLI flags over environment defaults.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let mut builder = AnalysisConfig::builder_from_env()
        .preview_rows(args.preview_rows)
        .non_numeric_policy(args.non_numeric.into())
        .include_missing_category(!args.exclude_missing_category);

    if let Some(ref input) = args.input {
        builder = builder.dataset_path(input);
    }
    if let Some(ref output) = args.output {
        builder = builder.output_dir(output);
    }
    if let Some(ref db) = args.db {
        builder = builder.database_path(db);
    }
    if let Some(ref column) = args.key_column {
        builder = builder.key_column(column);
    }
    if let Some(ref column) = args.churn_column {
        builder = builder.churn_column(column);
    }
    if let Some(ref column) = args.plan_column {
        builder = builder.plan_column(column);
    }
    if let Some(ref column) = args.charges_column {
        builder = builder.charges_column(column);
    }
    if let Some(ref column) = args.usage_column {
        builder = builder.usage_column(column);
    }
    if let Some(ref column) = args.data_column {
        builder = builder.data_column(column);
    }

    Ok(builder.build()?)
}

/// Run a read-only, parameterized query against the database.
#[cfg(feature = "sqlite")]
fn run_query(database: &Path, query: &str, params: &[String]) -> Result<DataFrame> {
    if !database.exists() {
        return Err(anyhow!("Database not found: {}", database.display()));
    }

    let params: Vec<QueryParam> = params.iter().map(|p| QueryParam::infer(p)).collect();
    let executor = SqliteExecutor::open_read_only(database)?;
    let result = executor.execute(query, &params)?;
    info!("Query returned {} rows", result.height());
    Ok(result)
}

/// Query support is not compiled in (fallback when "sqlite" feature is disabled)
#[cfg(not(feature = "sqlite"))]
fn run_query(_database: &Path, _query: &str, _params: &[String]) -> Result<DataFrame> {
    Err(anyhow!(
        "SQL support not compiled in. Compile with --features sqlite to enable queries."
    ))
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round().max(0.0) as usize;
    "#".repeat(len.min(BAR_WIDTH))
}

/// Print the dashboard as text.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
/// It is the presentation layer, so it must be visible regardless of log level.
fn print_dashboard(report: &DashboardReport) {
    let overview = &report.overview;

    println!();
    println!("{}", "=".repeat(80));
    println!("TELECOMMUNICATIONS DATA INSIGHTS");
    println!("{}", "=".repeat(80));
    println!(
        "Source: {} ({} rows x {} columns)",
        report.source, overview.rows, overview.columns
    );
    println!();

    // 1. Preview
    println!("DATASET PREVIEW");
    println!("{}", "-".repeat(40));
    let header: Vec<String> = overview
        .column_names
        .iter()
        .map(|name| format!("{:<14}", truncate_str(name, 13)))
        .collect();
    println!("  {}", header.join(" "));
    for row in &overview.preview {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| format!("{:<14}", truncate_str(cell.as_deref().unwrap_or("null"), 13)))
            .collect();
        println!("  {}", cells.join(" "));
    }
    println!();

    // 2. Data validation
    println!("DATA VALIDATION");
    println!("{}", "-".repeat(40));
    println!("Missing Values:");
    println!("  {:<24} {:>10} {:>10}", "Column", "Missing", "Missing %");
    for entry in &report.missing_values.columns {
        println!(
            "  {:<24} {:>10} {:>9.1}%",
            truncate_str(&entry.column, 23),
            entry.missing_count,
            entry.missing_percentage
        );
    }
    let incomplete = report.missing_values.columns_with_missing();
    if incomplete.is_empty() {
        println!("No missing values");
    } else {
        println!(
            "{} of {} columns have missing values: {}",
            incomplete.len(),
            report.missing_values.len(),
            incomplete.join(", ")
        );
    }
    println!(
        "Duplicate Records ({}): {} ({:.1}%)",
        report.duplicates.key_column,
        report.duplicates.duplicate_count,
        report.duplicates.duplicate_percentage
    );
    println!();

    // 3. Churn rate
    println!("INSIGHTS AND ANALYSIS");
    println!("{}", "-".repeat(40));
    println!("Churn Rate ({}):", report.churn_rate.column);
    if report.churn_rate.is_empty() {
        println!("  No rows");
    }
    for share in &report.churn_rate.categories {
        println!(
            "  {:<16} {:>6.1}% {}",
            truncate_str(share.value.as_deref().unwrap_or("(missing)"), 15),
            share.percentage,
            bar(share.percentage, 100.0)
        );
    }
    println!();

    // 4. Charges by plan
    let charges = &report.monthly_charges_by_plan;
    println!(
        "Average {} by {}:",
        charges.value_column, charges.group_column
    );
    let max_mean = charges.means.values().cloned().fold(0.0_f64, f64::max);
    if charges.is_empty() {
        println!("  No groups with numeric values");
    }
    for (plan, mean) in &charges.means {
        println!(
            "  {:<16} {:>10.2} {}",
            truncate_str(plan, 15),
            mean,
            bar(*mean, max_mean)
        );
    }
    println!();

    // 5. Scatter summary
    let scatter = &report.usage_vs_data;
    println!(
        "{} vs. {} by {}:",
        scatter.x_column, scatter.y_column, scatter.group_column
    );
    for (plan, points) in &scatter.groups {
        if points.is_empty() {
            println!("  {:<16} no complete points", truncate_str(plan, 15));
            continue;
        }
        let (x_min, x_max) = min_max(points.iter().map(|p| p.x));
        let (y_min, y_max) = min_max(points.iter().map(|p| p.y));
        println!(
            "  {:<16} {:>5} points  x: {:.1} - {:.1}  y: {:.2} - {:.2}",
            truncate_str(plan, 15),
            points.len(),
            x_min,
            x_max,
            y_min,
            y_max
        );
    }
    println!();
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
