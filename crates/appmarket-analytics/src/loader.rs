//! CSV loading for the raw listings table.
//!
//! The loader only guarantees that the file was readable and that the fixed
//! column set is present; row-level problems are the cleaner's and coercer's
//! business.

use crate::error::{AnalysisError, Result};
use crate::schema;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Literal markers treated as missing values at parse time.
const MISSING_MARKERS: [&str; 3] = ["NaN", "NA", "N/A"];

/// Read the listings table from a delimited file and verify its schema.
///
/// Fails with [`AnalysisError::InputNotFound`] if the path does not exist and
/// [`AnalysisError::MissingColumns`] if any required column is absent.
pub fn load_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(AnalysisError::InputNotFound(path.to_path_buf()));
    }

    let df = read_csv_with_fallback(path)?;
    verify_schema(&df)?;

    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Check that every required column is present.
pub fn verify_schema(df: &DataFrame) -> Result<()> {
    let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
    let missing: Vec<String> = schema::REQUIRED_COLUMNS
        .iter()
        .filter(|required| !names.contains(required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::MissingColumns { missing })
    }
}

/// Load CSV with a fallback strategy for quoting quirks in scraped exports.
fn read_csv_with_fallback(path: &Path) -> Result<DataFrame> {
    let null_markers: Vec<PlSmallStr> = MISSING_MARKERS.iter().map(|m| (*m).into()).collect();

    // Strategy 1: standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(NullValues::AllColumns(null_markers.clone()))),
        )
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: without quote handling
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default().with_null_values(Some(NullValues::AllColumns(null_markers))),
        )
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .map_err(AnalysisError::Polars)
}
