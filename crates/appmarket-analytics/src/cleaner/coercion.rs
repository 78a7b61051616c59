//! Numeric coercion of display-formatted columns.
//!
//! `Installs` arrives as `"1,000,000+"` and `Price` as `"$4.99"` (or `"0"`
//! for free listings). This module parses both into proper numeric columns
//! and normalizes the remaining numeric columns, with an explicit policy for
//! rows that do not parse.

use crate::config::CoercionPolicy;
use crate::error::{AnalysisError, Result};
use crate::schema;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Parse a display-formatted install count.
///
/// Strips one trailing `+` marker and all comma separators; the residual must
/// be pure ASCII digits.
pub fn parse_installs(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_suffix('+').unwrap_or(trimmed);
    let digits: String = stripped.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok()
}

/// Render an install count back into its display form (`1,000+`).
///
/// Inverse of [`parse_installs`] for non-negative values.
pub fn format_installs(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && c.is_ascii_digit() && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push('+');
    out
}

/// Parse a price string, stripping one leading `$`.
///
/// Rejects negative and non-finite values; `"0"` parses to `0.0`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix('$').unwrap_or(trimmed);
    if stripped.is_empty() {
        return None;
    }
    let value = stripped.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Outcome of one coercion pass.
#[derive(Debug, Clone, Default)]
pub struct CoercionOutcome {
    /// Rows removed under [`CoercionPolicy::DropRows`].
    pub rows_dropped: usize,
    /// Human-readable description of each action taken.
    pub actions: Vec<String>,
}

/// Coerces the formatted numeric columns and enforces the failure policy.
pub struct FieldCoercer {
    policy: CoercionPolicy,
}

impl FieldCoercer {
    pub fn new(policy: CoercionPolicy) -> Self {
        Self { policy }
    }

    /// Coerce `Installs` to Int64 and `Price` to Float64, then normalize
    /// `Rating`, `Reviews` and `Size_MBs` to numeric dtypes.
    ///
    /// Under [`CoercionPolicy::Fail`] any unparseable value aborts with
    /// [`AnalysisError::CoercionFailed`]; under [`CoercionPolicy::DropRows`]
    /// the offending rows are removed and counted.
    pub fn coerce(&self, df: DataFrame) -> Result<(DataFrame, CoercionOutcome)> {
        let mut outcome = CoercionOutcome::default();

        info!("Coercing formatted numeric columns...");

        let mut df = df;
        let mut failed_rows: Vec<usize> = Vec::new();

        let (installs, installs_failed) = coerce_installs_column(&df)?;
        let (price, price_failed) = coerce_price_column(&df)?;

        self.check_policy(schema::INSTALLS, &installs_failed)?;
        self.check_policy(schema::PRICE, &price_failed)?;

        df.replace(schema::INSTALLS, installs)?;
        df.replace(schema::PRICE, price)?;
        outcome
            .actions
            .push(format!("Coerced '{}' to integers", schema::INSTALLS));
        outcome
            .actions
            .push(format!("Coerced '{}' to floats", schema::PRICE));

        failed_rows.extend(installs_failed);
        failed_rows.extend(price_failed);
        failed_rows.sort_unstable();
        failed_rows.dedup();

        // Remaining numeric columns may have been read as strings depending
        // on what the schema inference saw; normalize them.
        df = normalize_numeric(df, schema::RATING, &DataType::Float64)?;
        df = normalize_numeric(df, schema::REVIEWS, &DataType::Int64)?;
        df = normalize_numeric(df, schema::SIZE_MBS, &DataType::Float64)?;

        if !failed_rows.is_empty() {
            // Policy already vetted: DropRows. Keep everything that parsed.
            let mut keep = vec![true; df.height()];
            for idx in &failed_rows {
                keep[*idx] = false;
            }
            let mask = BooleanChunked::from_slice("keep".into(), &keep);
            df = df.filter(&mask)?;
            outcome.rows_dropped = failed_rows.len();
            outcome.actions.push(format!(
                "Dropped {} row(s) that failed numeric coercion",
                outcome.rows_dropped
            ));
            warn!(
                "Dropped {} row(s) that failed numeric coercion",
                outcome.rows_dropped
            );
        }

        validate_complete(&df)?;
        debug!("Coercion complete: {} rows remain", df.height());

        Ok((df, outcome))
    }

    fn check_policy(&self, column: &str, failed: &[usize]) -> Result<()> {
        if failed.is_empty() || self.policy == CoercionPolicy::DropRows {
            return Ok(());
        }
        Err(AnalysisError::CoercionFailed {
            column: column.to_string(),
            rows: failed.to_vec(),
        })
    }
}

/// Cast a column to string so earlier schema inference never matters.
fn string_view(df: &DataFrame, name: &str) -> Result<Series> {
    let column = df
        .column(name)
        .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))?;
    Ok(column.as_materialized_series().cast(&DataType::String)?)
}

/// Parse the `Installs` column into Int64.
///
/// Returns the coerced series (null where parsing failed) plus the indices of
/// the failing rows.
fn coerce_installs_column(df: &DataFrame) -> Result<(Series, Vec<usize>)> {
    let cast = string_view(df, schema::INSTALLS)?;
    let values = cast.str()?;

    let mut result: Vec<Option<i64>> = Vec::with_capacity(values.len());
    let mut failed: Vec<usize> = Vec::new();
    for (idx, opt) in values.into_iter().enumerate() {
        match opt.and_then(parse_installs) {
            Some(v) => result.push(Some(v)),
            None => {
                result.push(None);
                failed.push(idx);
            }
        }
    }

    Ok((Series::new(schema::INSTALLS.into(), result), failed))
}

/// Parse the `Price` column into Float64.
fn coerce_price_column(df: &DataFrame) -> Result<(Series, Vec<usize>)> {
    let cast = string_view(df, schema::PRICE)?;
    let values = cast.str()?;

    let mut result: Vec<Option<f64>> = Vec::with_capacity(values.len());
    let mut failed: Vec<usize> = Vec::new();
    for (idx, opt) in values.into_iter().enumerate() {
        match opt.and_then(parse_price) {
            Some(v) => result.push(Some(v)),
            None => {
                result.push(None);
                failed.push(idx);
            }
        }
    }

    Ok((Series::new(schema::PRICE.into(), result), failed))
}

/// Cast a column to the expected numeric dtype, failing on value loss.
fn normalize_numeric(mut df: DataFrame, name: &str, dtype: &DataType) -> Result<DataFrame> {
    let column = df
        .column(name)
        .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series();
    if series.dtype() == dtype {
        return Ok(df);
    }

    let before_nulls = series.null_count();
    let cast = series
        .cast(dtype)
        .map_err(|_| AnalysisError::SchemaMismatch {
            column: name.to_string(),
            reason: format!("cannot cast {} to {dtype}", series.dtype()),
        })?;
    if cast.null_count() > before_nulls {
        return Err(AnalysisError::SchemaMismatch {
            column: name.to_string(),
            reason: format!(
                "{} value(s) were not representable as {dtype}",
                cast.null_count() - before_nulls
            ),
        });
    }

    df.replace(name, cast)?;
    Ok(df)
}

/// Explicit post-coercion validation: no retained column may hold a missing
/// value once coercion has run. Catches rows that only became invalid during
/// coercion instead of relying on the earlier completeness pass.
pub fn validate_complete(df: &DataFrame) -> Result<()> {
    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let mut missing = series.null_count();
        if let Ok(values) = series.f64() {
            missing += values.is_nan().sum().unwrap_or(0) as usize;
        }
        if missing > 0 {
            return Err(AnalysisError::SchemaMismatch {
                column: series.name().to_string(),
                reason: format!("{missing} missing value(s) after coercion"),
            });
        }
    }
    Ok(())
}
