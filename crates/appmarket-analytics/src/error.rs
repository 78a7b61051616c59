//! Custom error types for the listings analytics pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Load and
//! schema problems are fatal; coercion failures carry the offending row
//! indices so callers can report exactly which rows could not be parsed.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the analytics pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input file does not exist or is not a readable file.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input table lacks one or more required columns.
    #[error("Input is missing required columns: {missing:?}")]
    MissingColumns { missing: Vec<String> },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// A column is present but its values cannot be normalized to the
    /// expected domain.
    #[error("Column '{column}' failed schema validation: {reason}")]
    SchemaMismatch { column: String, reason: String },

    /// Individual rows failed numeric coercion under the `Fail` policy.
    #[error("{} row(s) in column '{column}' could not be coerced to a number (row indices {:?})", .rows.len(), .rows)]
    CoercionFailed { column: String, rows: Vec<usize> },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this error is row-level (individual bad records) as opposed
    /// to a structural failure of the whole table.
    pub fn is_row_level(&self) -> bool {
        match self {
            Self::CoercionFailed { .. } => true,
            Self::WithContext { source, .. } => source.is_row_level(),
            _ => false,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion_failed_display() {
        let error = AnalysisError::CoercionFailed {
            column: "Installs".to_string(),
            rows: vec![3, 7],
        };
        let message = error.to_string();
        assert!(message.contains("Installs"));
        assert!(message.contains("2 row(s)"));
        assert!(message.contains("[3, 7]"));
    }

    #[test]
    fn test_is_row_level() {
        let row_level = AnalysisError::CoercionFailed {
            column: "Price".to_string(),
            rows: vec![0],
        };
        assert!(row_level.is_row_level());
        assert!(row_level.with_context("coercion stage").is_row_level());
        assert!(!AnalysisError::ColumnNotFound("App".to_string()).is_row_level());
    }

    #[test]
    fn test_with_context() {
        let error =
            AnalysisError::ColumnNotFound("Genres".to_string()).with_context("During aggregation");
        assert!(error.to_string().contains("During aggregation"));
        assert!(error.to_string().contains("Genres"));
    }
}
