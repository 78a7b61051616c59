//! Shared data types of the analytics pipeline.

use crate::error::AnalysisError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Listing type of an app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppType {
    Free,
    Paid,
}

impl AppType {
    /// The label used in the `Type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppType::Free => "Free",
            AppType::Paid => "Paid",
        }
    }
}

impl FromStr for AppType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Free" => Ok(AppType::Free),
            "Paid" => Ok(AppType::Paid),
            other => Err(AnalysisError::SchemaMismatch {
                column: crate::schema::TYPE.to_string(),
                reason: format!("unknown listing type '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for AppType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one pipeline run: what each stage removed and why.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of rows before processing.
    pub rows_before: usize,
    /// Number of rows after processing.
    pub rows_after: usize,
    /// Number of columns before processing.
    pub columns_before: usize,
    /// Number of columns after processing (includes the derived column).
    pub columns_after: usize,
    /// Columns removed by the cleaner's projection.
    pub dropped_columns: Vec<String>,
    /// Rows removed because a retained attribute was missing.
    pub incomplete_rows_dropped: usize,
    /// Rows removed as duplicate listings.
    pub duplicate_rows_dropped: usize,
    /// Rows removed because a numeric field failed coercion.
    pub coercion_failures_dropped: usize,
    /// Rows removed by the price cap.
    pub priced_out_rows: usize,
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
    /// Human-readable description of each action taken.
    pub actions: Vec<String>,
    /// Warnings generated during processing.
    pub warnings: Vec<String>,
}

impl PipelineSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action taken by a stage.
    pub fn add_action(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    /// Record a warning.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Total rows removed across all stages.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Percentage of input rows removed.
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            return 0.0;
        }
        (self.rows_removed() as f64 / self.rows_before as f64) * 100.0
    }
}

/// The finished table and the run summary.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Cleaned, coerced, filtered table with the derived revenue column.
    pub frame: DataFrame,
    /// Per-stage accounting of the run.
    pub summary: PipelineSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_type_round_trip() {
        assert_eq!("Free".parse::<AppType>().unwrap(), AppType::Free);
        assert_eq!(" Paid ".parse::<AppType>().unwrap(), AppType::Paid);
        assert_eq!(AppType::Paid.as_str(), "Paid");
        assert!("Freemium".parse::<AppType>().is_err());
    }

    #[test]
    fn test_summary_percentages() {
        let mut summary = PipelineSummary::new();
        summary.rows_before = 200;
        summary.rows_after = 150;
        assert_eq!(summary.rows_removed(), 50);
        assert!((summary.rows_removed_percentage() - 25.0).abs() < f64::EPSILON);

        let empty = PipelineSummary::new();
        assert_eq!(empty.rows_removed_percentage(), 0.0);
    }
}
