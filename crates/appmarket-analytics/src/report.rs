//! Chart-ready aggregate tables for the external renderer.
//!
//! The renderer consumes finished tables and draws pie/bar/scatter/box
//! charts from them; only the shape and semantics of these tables are part
//! of this crate's contract. Everything here is serde-serializable so the
//! report can be printed as JSON or written to disk.

use crate::aggregate::Aggregator;
use crate::error::{Result, ResultExt};
use crate::schema;
use crate::types::{AppType, PipelineOutcome, PipelineSummary};
use crate::utils::{float_column, int_column, utf8_column};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// One label with an occurrence count (pie/bar charts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyedCount {
    pub label: String,
    pub count: u32,
}

/// One label with a summed value (horizontal bar chart).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyedSum {
    pub label: String,
    pub total: i64,
}

/// Per-category app count and install sum (scatter chart).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcentrationRow {
    pub category: String,
    pub apps: u32,
    pub installs: i64,
}

/// Per-(category, type) app count (grouped bar chart).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSplitRow {
    pub category: String,
    pub listing_type: String,
    pub apps: u32,
}

/// Install count with its listing type (box chart).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeInstallRow {
    pub listing_type: String,
    pub installs: i64,
}

/// An app ranked by one numeric value (top-N lists, tie sets).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedAppRow {
    pub app: String,
    pub value: f64,
}

/// One paid listing (per-category revenue and price box charts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaidAppRow {
    pub app: String,
    pub category: String,
    pub installs: i64,
    pub price: f64,
    pub revenue_estimate: f64,
}

/// Row limits for the ranked tables.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Categories shown in the category bar chart.
    pub top_categories: usize,
    /// Genre tokens shown in the genre bar chart.
    pub top_genres: usize,
    /// Apps in the most-reviewed list.
    pub most_reviewed: usize,
    /// Apps in the top-revenue list.
    pub top_revenue: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_categories: 10,
            top_genres: 15,
            most_reviewed: 50,
            top_revenue: 10,
        }
    }
}

/// Everything the renderer needs from one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated.
    pub generated_at: String,
    /// Path to the input file.
    pub input_file: String,
    /// Per-stage accounting of the run.
    pub summary: PipelineSummary,

    /// Content rating distribution (donut chart).
    pub content_rating_counts: Vec<KeyedCount>,
    /// Most populated categories (bar chart).
    pub top_categories: Vec<KeyedCount>,
    /// Install sums per category (horizontal bar chart).
    pub category_installs: Vec<KeyedSum>,
    /// App count vs install sum per category (scatter chart).
    pub category_concentration: Vec<ConcentrationRow>,
    /// Exploded genre token frequency (bar chart).
    pub genre_frequency: Vec<KeyedCount>,
    /// Free vs paid app counts within each category (grouped bar chart).
    pub free_vs_paid: Vec<TypeSplitRow>,
    /// Install counts with listing type (box chart).
    pub installs_by_type: Vec<TypeInstallRow>,

    /// All apps tied for the best rating.
    pub top_rated: Vec<RankedAppRow>,
    /// All apps tied for the largest file size.
    pub largest_apps: Vec<RankedAppRow>,
    /// Most-reviewed apps.
    pub most_reviewed: Vec<RankedAppRow>,
    /// Paid subset of the most-reviewed apps.
    pub most_reviewed_paid: Vec<RankedAppRow>,
    /// Highest revenue estimates.
    pub top_revenue_apps: Vec<RankedAppRow>,

    /// Every paid listing (per-category revenue/price box charts).
    pub paid_apps: Vec<PaidAppRow>,
    /// Median price across paid listings, if any exist.
    pub median_paid_price: Option<f64>,
}

/// Builds [`AnalysisReport`]s and writes run artifacts to the output
/// directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: Option<String>,
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf, output_name: Option<String>) -> Self {
        Self {
            output_dir,
            output_name,
        }
    }

    /// Assemble the full report from a pipeline outcome.
    pub fn build_report(
        input_file: &str,
        outcome: &PipelineOutcome,
        options: &ReportOptions,
    ) -> Result<AnalysisReport> {
        let aggregator = Aggregator::new(&outcome.frame);

        let content_rating_counts =
            keyed_counts(&aggregator.value_counts(schema::CONTENT_RATING)?, schema::CONTENT_RATING)?;
        let top_categories = truncated(
            keyed_counts(&aggregator.value_counts(schema::CATEGORY)?, schema::CATEGORY)?,
            options.top_categories,
        );
        let category_installs =
            keyed_sums(&aggregator.sum_by(schema::CATEGORY, schema::INSTALLS)?)?;
        let category_concentration =
            concentration_rows(&aggregator.category_concentration()?)?;
        let genre_frequency = truncated(
            keyed_counts(&aggregator.genre_frequency()?, schema::GENRE)?,
            options.top_genres,
        );
        let free_vs_paid =
            type_split_rows(&aggregator.count_by_pair(schema::CATEGORY, schema::TYPE)?)?;
        let installs_by_type = type_install_rows(&outcome.frame)?;

        let top_rated = ranked_rows(&aggregator.ties_at_max(schema::RATING)?, schema::RATING)?;
        let largest_apps =
            ranked_rows(&aggregator.ties_at_max(schema::SIZE_MBS)?, schema::SIZE_MBS)?;

        let most_reviewed_frame = aggregator.top_n(schema::REVIEWS, options.most_reviewed)?;
        let most_reviewed = ranked_rows(&most_reviewed_frame, schema::REVIEWS)?;
        let most_reviewed_paid = ranked_rows(
            &Aggregator::new(&most_reviewed_frame).paid_listings()?,
            schema::REVIEWS,
        )?;

        let top_revenue_apps = ranked_rows(
            &aggregator.top_n(schema::REVENUE_ESTIMATE, options.top_revenue)?,
            schema::REVENUE_ESTIMATE,
        )?;

        let paid_frame = aggregator.paid_apps()?;
        let paid_apps = paid_rows(&paid_frame)?;
        let median_paid_price = Aggregator::new(&paid_frame).median(schema::PRICE)?;

        Ok(AnalysisReport {
            generated_at: Local::now().to_rfc3339(),
            input_file: input_file.to_string(),
            summary: outcome.summary.clone(),
            content_rating_counts,
            top_categories,
            category_installs,
            category_concentration,
            genre_frequency,
            free_vs_paid,
            installs_by_type,
            top_rated,
            largest_apps,
            most_reviewed,
            most_reviewed_paid,
            top_revenue_apps,
            paid_apps,
            median_paid_price,
        })
    }

    /// Write the report as pretty JSON; returns the path written.
    pub fn write_report_to_file(&self, report: &AnalysisReport, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let name = self
            .output_name
            .clone()
            .unwrap_or_else(|| format!("{stem}_report"));
        let path = self.output_dir.join(format!("{name}.json"));

        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json)?;
        info!("Report written to {}", path.display());
        Ok(path)
    }

    /// Write the cleaned table as CSV; returns the path written.
    pub fn write_cleaned_csv(&self, frame: &DataFrame, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{stem}_cleaned.csv"));

        let mut file = fs::File::create(&path)?;
        let mut frame = frame.clone();
        CsvWriter::new(&mut file)
            .finish(&mut frame)
            .context("writing cleaned CSV")?;
        info!("Cleaned table written to {}", path.display());
        Ok(path)
    }
}

fn truncated<T>(mut rows: Vec<T>, limit: usize) -> Vec<T> {
    rows.truncate(limit);
    rows
}

fn keyed_counts(df: &DataFrame, label: &str) -> Result<Vec<KeyedCount>> {
    let labels = utf8_column(df, label)?;
    let counts = int_column(df, schema::COUNT)?;
    Ok(labels
        .into_iter()
        .zip(counts)
        .filter_map(|(label, count)| {
            Some(KeyedCount {
                label: label?,
                count: count? as u32,
            })
        })
        .collect())
}

fn keyed_sums(df: &DataFrame) -> Result<Vec<KeyedSum>> {
    let labels = utf8_column(df, schema::CATEGORY)?;
    let totals = int_column(df, schema::INSTALLS)?;
    Ok(labels
        .into_iter()
        .zip(totals)
        .filter_map(|(label, total)| {
            Some(KeyedSum {
                label: label?,
                total: total?,
            })
        })
        .collect())
}

fn concentration_rows(df: &DataFrame) -> Result<Vec<ConcentrationRow>> {
    let categories = utf8_column(df, schema::CATEGORY)?;
    let apps = int_column(df, schema::APPS)?;
    let installs = int_column(df, schema::INSTALLS)?;
    Ok(categories
        .into_iter()
        .zip(apps)
        .zip(installs)
        .filter_map(|((category, apps), installs)| {
            Some(ConcentrationRow {
                category: category?,
                apps: apps? as u32,
                installs: installs?,
            })
        })
        .collect())
}

fn type_split_rows(df: &DataFrame) -> Result<Vec<TypeSplitRow>> {
    let categories = utf8_column(df, schema::CATEGORY)?;
    let types = utf8_column(df, schema::TYPE)?;
    let counts = int_column(df, schema::COUNT)?;
    Ok(categories
        .into_iter()
        .zip(types)
        .zip(counts)
        .filter_map(|((category, listing_type), apps)| {
            Some(TypeSplitRow {
                category: category?,
                listing_type: listing_type?,
                apps: apps? as u32,
            })
        })
        .collect())
}

fn type_install_rows(frame: &DataFrame) -> Result<Vec<TypeInstallRow>> {
    let types = utf8_column(frame, schema::TYPE)?;
    let installs = int_column(frame, schema::INSTALLS)?;
    Ok(types
        .into_iter()
        .zip(installs)
        .filter_map(|(listing_type, installs)| {
            Some(TypeInstallRow {
                listing_type: listing_type?,
                installs: installs?,
            })
        })
        .collect())
}

fn ranked_rows(df: &DataFrame, value: &str) -> Result<Vec<RankedAppRow>> {
    let apps = utf8_column(df, schema::APP)?;
    let values = float_column(df, value)?;
    Ok(apps
        .into_iter()
        .zip(values)
        .filter_map(|(app, value)| {
            Some(RankedAppRow {
                app: app?,
                value: value?,
            })
        })
        .collect())
}

fn paid_rows(df: &DataFrame) -> Result<Vec<PaidAppRow>> {
    let apps = utf8_column(df, schema::APP)?;
    let categories = utf8_column(df, schema::CATEGORY)?;
    let installs = int_column(df, schema::INSTALLS)?;
    let prices = float_column(df, schema::PRICE)?;
    let revenues = float_column(df, schema::REVENUE_ESTIMATE)?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let (Some(app), Some(category), Some(installs), Some(price), Some(revenue_estimate)) = (
            apps[i].clone(),
            categories[i].clone(),
            installs[i],
            prices[i],
            revenues[i],
        ) else {
            continue;
        };
        rows.push(PaidAppRow {
            app,
            category,
            installs,
            price,
            revenue_estimate,
        });
    }
    Ok(rows)
}

/// Free-vs-paid split of the whole table, for the run summary line.
pub fn type_breakdown(frame: &DataFrame) -> Result<(usize, usize)> {
    let types = utf8_column(frame, schema::TYPE)?;
    let mut free = 0;
    let mut paid = 0;
    for value in types.into_iter().flatten() {
        if value == AppType::Paid.as_str() {
            paid += 1;
        } else {
            free += 1;
        }
    }
    Ok((free, paid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PipelineSummary;

    fn outcome() -> PipelineOutcome {
        let frame = df!(
            schema::APP => ["Alpha", "Beta", "Gamma"],
            schema::CATEGORY => ["GAME", "GAME", "TOOLS"],
            schema::RATING => [4.5f64, 5.0, 4.0],
            schema::REVIEWS => [100i64, 400, 50],
            schema::SIZE_MBS => [20.0f64, 50.0, 9.0],
            schema::INSTALLS => [1000i64, 50000, 500],
            schema::TYPE => ["Free", "Free", "Paid"],
            schema::PRICE => [0.0f64, 0.0, 2.99],
            schema::CONTENT_RATING => ["Everyone", "Teen", "Everyone"],
            schema::GENRES => ["Action;Adventure", "Action", "Tools"],
            schema::REVENUE_ESTIMATE => [0.0f64, 0.0, 1495.0],
        )
        .unwrap();
        PipelineOutcome {
            frame,
            summary: PipelineSummary::new(),
        }
    }

    #[test]
    fn test_build_report_tables() {
        let outcome = outcome();
        let report = ReportGenerator::build_report(
            "apps.csv",
            &outcome,
            &ReportOptions::default(),
        )
        .unwrap();

        assert_eq!(report.input_file, "apps.csv");
        assert_eq!(report.content_rating_counts.len(), 2);
        assert_eq!(report.content_rating_counts[0].label, "Everyone");
        assert_eq!(report.content_rating_counts[0].count, 2);

        assert_eq!(report.category_installs[0].label, "GAME");
        assert_eq!(report.category_installs[0].total, 51000);

        assert_eq!(report.genre_frequency[0].label, "Action");
        assert_eq!(report.genre_frequency[0].count, 2);

        assert_eq!(report.top_rated.len(), 1);
        assert_eq!(report.top_rated[0].app, "Beta");

        assert_eq!(report.paid_apps.len(), 1);
        assert_eq!(report.paid_apps[0].app, "Gamma");
        assert_eq!(report.paid_apps[0].revenue_estimate, 1495.0);
        assert_eq!(report.median_paid_price, Some(2.99));

        assert_eq!(report.most_reviewed.len(), 3);
        assert_eq!(report.most_reviewed_paid.len(), 1);
        assert_eq!(report.most_reviewed_paid[0].app, "Gamma");
    }

    #[test]
    fn test_report_limits_apply() {
        let outcome = outcome();
        let options = ReportOptions {
            top_categories: 1,
            top_genres: 2,
            most_reviewed: 2,
            top_revenue: 1,
        };
        let report = ReportGenerator::build_report("apps.csv", &outcome, &options).unwrap();

        assert_eq!(report.top_categories.len(), 1);
        assert_eq!(report.genre_frequency.len(), 2);
        assert_eq!(report.most_reviewed.len(), 2);
        assert_eq!(report.top_revenue_apps.len(), 1);
        // The only paid app is not among the top 2 most reviewed.
        assert!(report.most_reviewed_paid.is_empty());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let outcome = outcome();
        let report =
            ReportGenerator::build_report("apps.csv", &outcome, &ReportOptions::default()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("category_concentration"));
        assert!(json.contains("median_paid_price"));
    }

    #[test]
    fn test_write_report_to_file() {
        let outcome = outcome();
        let report =
            ReportGenerator::build_report("apps.csv", &outcome, &ReportOptions::default()).unwrap();

        let dir = std::env::temp_dir().join("appmarket_analytics_report_test");
        let generator = ReportGenerator::new(dir.clone(), None);
        let path = generator.write_report_to_file(&report, "apps").unwrap();

        assert!(path.ends_with("apps_report.json"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("genre_frequency"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_type_breakdown() {
        let outcome = outcome();
        let (free, paid) = type_breakdown(&outcome.frame).unwrap();
        assert_eq!((free, paid), (2, 1));
    }
}
