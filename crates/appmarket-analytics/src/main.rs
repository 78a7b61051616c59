//! CLI entry point for the listings analytics pipeline.

use anyhow::{Result, anyhow};
use appmarket_analytics::{
    CoercionPolicy, Pipeline, PipelineConfig, ReportGenerator, ReportOptions,
};
use clap::{Parser, ValueEnum};
use polars::prelude::*;
use std::path::Path;
use tracing::{error, info};

/// CLI-compatible coercion policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCoercionPolicy {
    /// Drop rows whose numeric fields do not parse, recording the count
    Drop,
    /// Abort the run on the first unparseable numeric field
    Fail,
}

impl From<CliCoercionPolicy> for CoercionPolicy {
    fn from(cli: CliCoercionPolicy) -> Self {
        match cli {
            CliCoercionPolicy::Drop => CoercionPolicy::DropRows,
            CliCoercionPolicy::Fail => CoercionPolicy::Fail,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Cleaning and aggregation pipeline for app marketplace listings",
    long_about = "Cleans a scraped app-listings CSV (deduplication, numeric\n\
                  coercion, price-anomaly filtering), derives revenue\n\
                  estimates, and emits chart-ready aggregate tables.\n\n\
                  EXAMPLES:\n  \
                  # Summarize a listings export\n  \
                  appmarket-analytics -i apps.csv\n\n  \
                  # Inspect the raw table without processing\n  \
                  appmarket-analytics -i apps.csv --preview\n\n  \
                  # Machine-readable output for the chart renderer\n  \
                  appmarket-analytics -i apps.csv --json > report.json"
)]
struct Args {
    /// Path to the listings CSV file to process
    #[arg(short, long)]
    input: String,

    /// Output directory for emitted files
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Custom report file name (without extension)
    #[arg(long)]
    output_name: Option<String>,

    /// Exclusive price cap; listings at or above it are dropped as anomalies
    #[arg(long, default_value = "250.0")]
    price_cap: f64,

    /// Policy for rows whose installs/price fields do not parse
    #[arg(long, value_enum, default_value = "drop")]
    coercion_policy: CliCoercionPolicy,

    /// Number of categories to keep in the top-categories table
    #[arg(long, default_value = "10")]
    top_categories: usize,

    /// Number of genre tokens to keep in the genre-frequency table
    #[arg(long, default_value = "15")]
    top_genres: usize,

    /// Show the raw table's shape and column statistics, then exit
    #[arg(long)]
    preview: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and the final summary)
    #[arg(short, long)]
    quiet: bool,

    /// Output the report as JSON to stdout instead of a human summary
    ///
    /// Disables all progress logs; only the JSON report is written.
    #[arg(long)]
    json: bool,

    /// Write the JSON report to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Write the cleaned table as CSV to the output directory
    #[arg(long)]
    emit_cleaned: bool,
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

    info!("Loading listings from: {}", args.input);
    let data = appmarket_analytics::load_table(&args.input)
        .map_err(|e| anyhow!("Failed to load input: {e}"))?;

    if args.preview {
        return run_preview(&args, &data);
    }

    let config = PipelineConfig::builder()
        .price_cap(args.price_cap)
        .coercion_policy(args.coercion_policy.into())
        .build()
        .map_err(|e| anyhow!("Invalid configuration: {e}"))?;

    let pipeline = Pipeline::builder()
        .config(config)
        .build()
        .map_err(|e| anyhow!("Invalid configuration: {e}"))?;

    let outcome = match pipeline.process(data) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {e}"));
        }
    };

    let options = ReportOptions {
        top_categories: args.top_categories,
        top_genres: args.top_genres,
        ..ReportOptions::default()
    };
    let report = ReportGenerator::build_report(&args.input, &outcome, &options)
        .map_err(|e| anyhow!("Failed to build report: {e}"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let stem = extract_file_stem(&args.input);
    if args.emit_report || args.emit_cleaned {
        let generator = ReportGenerator::new(args.output.clone().into(), args.output_name.clone());
        if args.emit_report {
            let path = generator.write_report_to_file(&report, &stem)?;
            info!("Report written to: {}", path.display());
        }
        if args.emit_cleaned {
            let path = generator.write_cleaned_csv(&outcome.frame, &stem)?;
            info!("Cleaned table written to: {}", path.display());
        }
    }

    print_human_readable_summary(&report, &outcome.frame);
    Ok(())
}

/// Show the raw table without processing it.
///
/// Note: this function uses `println!` intentionally for user-facing CLI
/// output; unlike logging it should always be visible since it is the whole
/// point of --preview.
fn run_preview(args: &Args, data: &DataFrame) -> Result<()> {
    println!("\n{}", "=".repeat(80));
    println!("PREVIEW - raw listings table");
    println!("{}\n", "=".repeat(80));

    println!("  File: {}", args.input);
    println!("  Rows: {}", data.height());
    println!("  Columns: {}", data.width());
    println!();

    println!("COLUMN STATISTICS");
    println!("{}", "-".repeat(40));
    match data.describe(None) {
        Ok(stats) => println!("{stats}"),
        Err(e) => println!("  (describe unavailable: {e})"),
    }
    println!();

    println!("FIRST ROWS");
    println!("{}", "-".repeat(40));
    println!("{}", data.head(Some(5)));

    println!("{}", "=".repeat(80));
    println!("To process this table, run without --preview");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Print a human-readable summary of the run and the headline aggregates.
fn print_human_readable_summary(
    report: &appmarket_analytics::AnalysisReport,
    frame: &DataFrame,
) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("ANALYSIS COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file, summary.rows_before, summary.columns_before
    );
    println!(
        "Kept:   {} rows x {} columns",
        summary.rows_after, summary.columns_after
    );
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed, {:.1}%)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed(),
        summary.rows_removed_percentage()
    );
    println!(
        "    incomplete: {}, duplicates: {}, failed coercion: {}, priced out: {}",
        summary.incomplete_rows_dropped,
        summary.duplicate_rows_dropped,
        summary.coercion_failures_dropped,
        summary.priced_out_rows
    );
    if let Ok((free, paid)) = appmarket_analytics::report::type_breakdown(frame) {
        println!("  Listings: {free} free, {paid} paid");
    }
    if let Some(median) = report.median_paid_price {
        println!("  Median paid price: ${median:.2}");
    }
    println!();

    if !report.top_categories.is_empty() {
        println!("Top Categories (by app count):");
        for row in &report.top_categories {
            println!("  {:<24} {}", row.label, row.count);
        }
        println!();
    }

    if !report.top_revenue_apps.is_empty() {
        println!("Top Revenue Estimates:");
        for row in &report.top_revenue_apps {
            println!("  {:<40} {:>14.0}", row.app, row.value);
        }
        println!();
    }

    if !report.genre_frequency.is_empty() {
        println!("Top Genres:");
        for row in &report.genre_frequency {
            println!("  {:<24} {}", row.label, row.count);
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {warning}");
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the JSON report");
    println!("{}", "=".repeat(80));
}
