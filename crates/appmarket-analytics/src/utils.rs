//! Shared column-access helpers.
//!
//! The aggregation engine works on plain Rust values; these helpers pull a
//! column out of a `DataFrame` as `Vec<Option<T>>` in row order.

use crate::error::{AnalysisError, Result};
use polars::prelude::*;

/// Fetch a column or fail with a domain error instead of a raw polars one.
pub(crate) fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))
}

/// Collect a string column as owned values in row order.
pub(crate) fn utf8_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = column(df, name)?.as_materialized_series();
    let cast = series.cast(&DataType::String)?;
    let ca = cast.str()?;
    Ok(ca
        .into_iter()
        .map(|opt| opt.map(|v| v.to_string()))
        .collect())
}

/// Collect a numeric column as `i64` values in row order.
///
/// A cast that loses values (string column with non-numeric content) is a
/// schema error, not a silent null.
pub(crate) fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = column(df, name)?.as_materialized_series();
    let cast = checked_cast(series, &DataType::Int64, name)?;
    Ok(cast.i64()?.into_iter().collect())
}

/// Collect a numeric column as `f64` values in row order.
pub(crate) fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = column(df, name)?.as_materialized_series();
    let cast = checked_cast(series, &DataType::Float64, name)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Cast a series, treating any value lost in the cast as a schema mismatch.
fn checked_cast(series: &Series, dtype: &DataType, name: &str) -> Result<Series> {
    let cast = series
        .cast(dtype)
        .map_err(|_| AnalysisError::SchemaMismatch {
            column: name.to_string(),
            reason: format!("cannot cast {} to {dtype}", series.dtype()),
        })?;
    if cast.null_count() > series.null_count() {
        return Err(AnalysisError::SchemaMismatch {
            column: name.to_string(),
            reason: format!(
                "{} value(s) were not representable as {dtype}",
                cast.null_count() - series.null_count()
            ),
        });
    }
    Ok(cast)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df!(
            "Name" => ["a", "b", "c"],
            "Score" => [1i64, 2, 3],
            "Weight" => [0.5f64, 1.5, 2.5],
        )
        .unwrap()
    }

    #[test]
    fn test_utf8_column() {
        let df = sample_frame();
        let values = utf8_column(&df, "Name").unwrap();
        assert_eq!(
            values,
            vec![
                Some("a".to_string()),
                Some("b".to_string()),
                Some("c".to_string())
            ]
        );
    }

    #[test]
    fn test_int_and_float_columns() {
        let df = sample_frame();
        assert_eq!(
            int_column(&df, "Score").unwrap(),
            vec![Some(1), Some(2), Some(3)]
        );
        assert_eq!(
            float_column(&df, "Weight").unwrap(),
            vec![Some(0.5), Some(1.5), Some(2.5)]
        );
    }

    #[test]
    fn test_missing_column_is_domain_error() {
        let df = sample_frame();
        let err = utf8_column(&df, "Nope").unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(name) if name == "Nope"));
    }

    #[test]
    fn test_non_numeric_column_is_schema_error() {
        let df = sample_frame();
        let err = int_column(&df, "Name").unwrap_err();
        assert!(matches!(err, AnalysisError::SchemaMismatch { .. }));
    }
}
