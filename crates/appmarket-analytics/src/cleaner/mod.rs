//! Structural cleaning of the raw listings table.
//!
//! This module provides functionality for:
//! - Dropping columns with no downstream use
//! - Dropping rows with a missing value in any retained column
//! - Removing duplicate listings by identity key
//!
//! The order matters: the projection runs first so that a row is not thrown
//! away over a missing value in a column that was about to be dropped, and
//! deduplication sees the full set of complete rows.

pub mod coercion;

pub use coercion::FieldCoercer;

use crate::error::Result;
use crate::schema;
use polars::prelude::*;
use tracing::{debug, info};

/// Structural cleaner: projection, completeness, deduplication.
pub struct DataCleaner;

impl DataCleaner {
    /// Run the three cleaning passes in order.
    ///
    /// Returns the cleaned frame together with a description of each action,
    /// plus the per-pass row counts (incomplete, duplicates).
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningOutcome)> {
        let mut outcome = CleaningOutcome::default();

        info!("Cleaning raw listings table...");

        // 1. Pure projection: remove columns with no downstream use.
        let present: Vec<PlSmallStr> = df
            .get_column_names()
            .into_iter()
            .filter(|name| schema::DROPPED_COLUMNS.contains(&name.as_str()))
            .cloned()
            .collect();
        let df = if present.is_empty() {
            outcome.actions.push("No unused columns present".to_string());
            df
        } else {
            outcome.dropped_columns = present.iter().map(|c| c.to_string()).collect();
            outcome
                .actions
                .push(format!("Dropped unused columns: {:?}", outcome.dropped_columns));
            debug!("Dropped columns: {:?}", outcome.dropped_columns);
            df.drop_many(present)
        };

        // 2. Remove rows with a missing value in any remaining column.
        let before_incomplete = df.height();
        let df = self.drop_incomplete_rows(df)?;
        outcome.incomplete_rows = before_incomplete - df.height();
        if outcome.incomplete_rows > 0 {
            let pct = (outcome.incomplete_rows as f64 / before_incomplete as f64) * 100.0;
            outcome.actions.push(format!(
                "Removed {} incomplete rows ({:.1}%)",
                outcome.incomplete_rows, pct
            ));
            debug!("Removed {} incomplete rows", outcome.incomplete_rows);
        } else {
            outcome.actions.push("No incomplete rows found".to_string());
        }

        // 3. Deduplicate listings on the identity key, keeping the first
        //    occurrence in input order.
        let before_duplicates = df.height();
        let identity_subset: Vec<String> =
            schema::IDENTITY_KEY.iter().map(|c| c.to_string()).collect();
        let df = df.unique_stable(
            Some(&identity_subset),
            UniqueKeepStrategy::First,
            None,
        )?;
        outcome.duplicate_rows = before_duplicates - df.height();
        if outcome.duplicate_rows > 0 {
            let pct = (outcome.duplicate_rows as f64 / before_duplicates as f64) * 100.0;
            outcome.actions.push(format!(
                "Removed {} duplicate listings ({:.1}%)",
                outcome.duplicate_rows, pct
            ));
            debug!("Removed {} duplicate listings", outcome.duplicate_rows);
        } else {
            outcome.actions.push("No duplicate listings found".to_string());
        }

        Ok((df, outcome))
    }

    /// A row is incomplete if any remaining column is null, or NaN in a
    /// float column. NaN markers in the source parse to float NaN rather
    /// than null, so a plain null check is not enough.
    fn drop_incomplete_rows(&self, df: DataFrame) -> Result<DataFrame> {
        if df.width() == 0 || df.height() == 0 {
            return Ok(df);
        }

        let mut complete = BooleanChunked::full("complete".into(), true, df.height());
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            complete = &complete & &series.is_not_null();
            if let Ok(values) = series.f64() {
                complete = &complete & &!values.is_nan();
            }
        }

        Ok(df.filter(&complete)?)
    }
}

/// Row/column accounting of one cleaning run.
#[derive(Debug, Clone, Default)]
pub struct CleaningOutcome {
    pub dropped_columns: Vec<String>,
    pub incomplete_rows: usize,
    pub duplicate_rows: usize,
    pub actions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        df!(
            schema::APP => ["Alpha", "Alpha", "Beta", "Gamma"],
            schema::CATEGORY => ["GAME", "GAME", "TOOLS", "GAME"],
            schema::RATING => [4.5f64, 4.5, 4.0, 3.5],
            schema::REVIEWS => [100i64, 100, 50, 10],
            schema::SIZE_MBS => [20.0f64, 20.0, 9.0, 5.0],
            schema::INSTALLS => ["1,000+", "1,000+", "500+", "10+"],
            schema::TYPE => ["Free", "Free", "Paid", "Paid"],
            schema::PRICE => ["0", "0", "$2.99", "$1.49"],
            schema::CONTENT_RATING => ["Everyone", "Everyone", "Teen", "Everyone"],
            schema::GENRES => ["Action", "Action", "Tools", "Casual"],
            schema::LAST_UPDATED => ["2018-01-01", "2018-02-01", "2018-03-01", "2018-04-01"],
            schema::ANDROID_VER => ["4.0", "4.0", "5.0", "4.4"],
        )
        .unwrap()
    }

    #[test]
    fn test_projection_removes_unused_columns() {
        let (cleaned, outcome) = DataCleaner.clean(raw_frame()).unwrap();
        let names: Vec<&str> = cleaned
            .get_column_names()
            .iter()
            .map(|s| s.as_str())
            .collect();
        assert!(!names.contains(&schema::LAST_UPDATED));
        assert!(!names.contains(&schema::ANDROID_VER));
        assert_eq!(outcome.dropped_columns.len(), 2);
    }

    #[test]
    fn test_deduplication_keeps_first_occurrence() {
        // The two Alpha rows share (App, Type, Price) but differ in
        // Last_Updated, which is projected away before deduplication.
        let (cleaned, outcome) = DataCleaner.clean(raw_frame()).unwrap();
        assert_eq!(cleaned.height(), 3);
        assert_eq!(outcome.duplicate_rows, 1);

        let apps = cleaned
            .column(schema::APP)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(apps, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_null_only_in_dropped_column_survives() {
        let df = df!(
            schema::APP => ["Alpha"],
            schema::CATEGORY => ["GAME"],
            schema::RATING => [4.5f64],
            schema::REVIEWS => [100i64],
            schema::SIZE_MBS => [20.0f64],
            schema::INSTALLS => ["1,000+"],
            schema::TYPE => ["Free"],
            schema::PRICE => ["0"],
            schema::CONTENT_RATING => ["Everyone"],
            schema::GENRES => ["Action"],
            schema::LAST_UPDATED => [None::<&str>],
            schema::ANDROID_VER => ["4.0"],
        )
        .unwrap();

        let (cleaned, outcome) = DataCleaner.clean(df).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(outcome.incomplete_rows, 0);
    }

    #[test]
    fn test_null_and_nan_rows_are_dropped() {
        let df = df!(
            schema::APP => ["Alpha", "Beta", "Gamma"],
            schema::CATEGORY => ["GAME", "TOOLS", "GAME"],
            schema::RATING => [Some(4.5f64), None, Some(f64::NAN)],
            schema::REVIEWS => [100i64, 50, 10],
            schema::SIZE_MBS => [20.0f64, 9.0, 5.0],
            schema::INSTALLS => ["1,000+", "500+", "10+"],
            schema::TYPE => ["Free", "Paid", "Paid"],
            schema::PRICE => ["0", "$2.99", "$1.49"],
            schema::CONTENT_RATING => ["Everyone", "Teen", "Everyone"],
            schema::GENRES => ["Action", "Tools", "Casual"],
            schema::LAST_UPDATED => ["2018-01-01", "2018-03-01", "2018-04-01"],
            schema::ANDROID_VER => ["4.0", "5.0", "4.4"],
        )
        .unwrap();

        let (cleaned, outcome) = DataCleaner.clean(df).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(outcome.incomplete_rows, 2);
    }

    #[test]
    fn test_empty_frame_is_cleaned_to_empty() {
        let raw = raw_frame();
        let empty = raw.head(Some(0));
        let (cleaned, outcome) = DataCleaner.clean(empty).unwrap();
        assert_eq!(cleaned.height(), 0);
        assert_eq!(outcome.incomplete_rows, 0);
        assert_eq!(outcome.duplicate_rows, 0);
    }
}
