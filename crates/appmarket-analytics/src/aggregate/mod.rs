//! Read-only queries over the finished listings table.
//!
//! Every query here recomputes from the table it was given; nothing is
//! cached and nothing mutates. Empty input produces empty output, never an
//! error, so callers can hand an empty table to the chart renderer without
//! special cases.

mod engine;
mod explode;

pub use explode::explode_genres;

use crate::error::Result;
use crate::schema;
use crate::types::AppType;
use crate::utils::{float_column, int_column, utf8_column};
use polars::prelude::*;
use tracing::debug;

/// Read-only aggregate queries over a cleaned listings table.
pub struct Aggregator<'a> {
    frame: &'a DataFrame,
    genre_delimiter: char,
}

impl<'a> Aggregator<'a> {
    pub fn new(frame: &'a DataFrame) -> Self {
        Self {
            frame,
            genre_delimiter: ';',
        }
    }

    /// Use a non-default genre tag delimiter.
    pub fn with_genre_delimiter(mut self, delimiter: char) -> Self {
        self.genre_delimiter = delimiter;
        self
    }

    /// The N rows with the largest value in `column`; stable descending
    /// order, ties broken by input order.
    pub fn top_n(&self, column: &str, n: usize) -> Result<DataFrame> {
        let values = float_column(self.frame, column)?;
        let mut indices: Vec<u32> = (0..values.len() as u32).collect();
        indices.sort_by(|a, b| {
            let va = values[*a as usize].unwrap_or(f64::NEG_INFINITY);
            let vb = values[*b as usize].unwrap_or(f64::NEG_INFINITY);
            vb.total_cmp(&va)
        });
        indices.truncate(n);

        let idx = IdxCa::from_vec("idx".into(), indices);
        Ok(self.frame.take(&idx)?)
    }

    /// All rows whose value in `column` equals that column's maximum.
    pub fn ties_at_max(&self, column: &str) -> Result<DataFrame> {
        let series = self
            .frame
            .column(column)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;

        let Some(max) = series.f64()?.max() else {
            // No non-null values at all: the tie set is empty.
            return Ok(self.frame.head(Some(0)));
        };

        let mask = series.equal(max)?;
        Ok(self.frame.filter(&mask)?)
    }

    /// Occurrence count of each distinct value in a categorical column,
    /// descending by count.
    pub fn value_counts(&self, column: &str) -> Result<DataFrame> {
        let keys = utf8_column(self.frame, column)?;
        let counts = engine::sort_desc(engine::group_count(keys.into_iter().flatten()));
        debug!("{} distinct values in '{}'", counts.len(), column);

        let (labels, values): (Vec<String>, Vec<u32>) = counts.into_iter().unzip();
        Ok(df!(column => labels, schema::COUNT => values)?)
    }

    /// Group rows by `key` and sum `value` per group, descending by the sum.
    pub fn sum_by(&self, key: &str, value: &str) -> Result<DataFrame> {
        let keys = utf8_column(self.frame, key)?;
        let values = int_column(self.frame, value)?;
        let pairs = keys
            .into_iter()
            .zip(values)
            .filter_map(|(k, v)| Some((k?, v?)));

        let sums = engine::sort_desc(engine::group_sum(pairs));
        let (labels, totals): (Vec<String>, Vec<i64>) = sums.into_iter().unzip();
        Ok(df!(key => labels, value => totals)?)
    }

    /// Group rows by `key` and count members per group, in first-seen order.
    pub fn count_by(&self, key: &str) -> Result<DataFrame> {
        let keys = utf8_column(self.frame, key)?;
        let counts = engine::group_count(keys.into_iter().flatten());
        let (labels, values): (Vec<String>, Vec<u32>) = counts.into_iter().unzip();
        Ok(df!(key => labels, schema::COUNT => values)?)
    }

    /// Group rows jointly by two categorical columns and count members per
    /// pair, in first-seen order.
    pub fn count_by_pair(&self, first: &str, second: &str) -> Result<DataFrame> {
        let first_keys = utf8_column(self.frame, first)?;
        let second_keys = utf8_column(self.frame, second)?;
        let pairs = first_keys
            .into_iter()
            .zip(second_keys)
            .filter_map(|(a, b)| Some((a?, b?)));

        let counts = engine::group_count(pairs);
        let (keys, values): (Vec<(String, String)>, Vec<u32>) = counts.into_iter().unzip();
        let (firsts, seconds): (Vec<String>, Vec<String>) = keys.into_iter().unzip();
        Ok(df!(first => firsts, second => seconds, schema::COUNT => values)?)
    }

    /// The `Genres` column exploded into one observation per token, with a
    /// `Source_Row` back-reference.
    pub fn exploded_genres(&self) -> Result<DataFrame> {
        explode::explode_genres(self.frame, self.genre_delimiter)
    }

    /// Occurrence count of each genre token across the exploded column,
    /// descending by count.
    pub fn genre_frequency(&self) -> Result<DataFrame> {
        let exploded = self.exploded_genres()?;
        let tokens = utf8_column(&exploded, schema::GENRE)?;
        let counts = engine::sort_desc(engine::group_count(tokens.into_iter().flatten()));
        debug!("{} distinct genre tokens", counts.len());

        let (labels, values): (Vec<String>, Vec<u32>) = counts.into_iter().unzip();
        Ok(df!(schema::GENRE => labels, schema::COUNT => values)?)
    }

    /// Per-category app count joined with per-category install sum
    /// (inner join), descending by installs.
    ///
    /// Columns: `Category`, `Apps`, `Installs`.
    pub fn category_concentration(&self) -> Result<DataFrame> {
        let sums = self.sum_by(schema::CATEGORY, schema::INSTALLS)?;
        let counts = self.count_by(schema::CATEGORY)?;

        // The sum table is already descending by installs; joining with it
        // on the left keeps that order.
        let mut joined = inner_join_on_key(&sums, &counts, schema::CATEGORY)?;
        joined.rename(schema::COUNT, schema::APPS.into())?;
        Ok(joined.select([schema::CATEGORY, schema::APPS, schema::INSTALLS])?)
    }

    /// The Paid-type rows with every column intact.
    pub fn paid_listings(&self) -> Result<DataFrame> {
        let types = utf8_column(self.frame, schema::TYPE)?;
        let mask: Vec<bool> = types
            .iter()
            .map(|t| t.as_deref() == Some(AppType::Paid.as_str()))
            .collect();
        let mask = BooleanChunked::from_slice("paid".into(), &mask);
        Ok(self.frame.filter(&mask)?)
    }

    /// The Paid-type subset with the columns the revenue and price charts
    /// consume.
    pub fn paid_apps(&self) -> Result<DataFrame> {
        let paid = self.paid_listings()?;
        Ok(paid.select([
            schema::APP,
            schema::CATEGORY,
            schema::INSTALLS,
            schema::PRICE,
            schema::REVENUE_ESTIMATE,
        ])?)
    }

    /// Median of a numeric column; `None` when the column has no values.
    pub fn median(&self, column: &str) -> Result<Option<f64>> {
        let mut values: Vec<f64> = float_column(self.frame, column)?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect();
        if values.is_empty() {
            return Ok(None);
        }

        values.sort_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        let median = if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };
        Ok(Some(median))
    }
}

/// Inner-join two keyed aggregate tables on `key`.
///
/// Each side contributes its first non-key column; only keys present on both
/// sides survive, in the left side's row order. When both value columns share
/// a name, the right one gets a `_right` suffix.
pub fn inner_join_on_key(left: &DataFrame, right: &DataFrame, key: &str) -> Result<DataFrame> {
    let left_value = value_column_name(left, key)?;
    let right_value = value_column_name(right, key)?;

    let left_pairs: Vec<(String, i64)> = keyed_values(left, key, &left_value)?;
    let right_pairs: Vec<(String, i64)> = keyed_values(right, key, &right_value)?;

    let joined = engine::inner_join(left_pairs, right_pairs);

    let mut keys = Vec::with_capacity(joined.len());
    let mut left_out = Vec::with_capacity(joined.len());
    let mut right_out = Vec::with_capacity(joined.len());
    for (k, l, r) in joined {
        keys.push(k);
        left_out.push(l);
        right_out.push(r);
    }

    let right_name = if right_value == left_value {
        format!("{right_value}_right")
    } else {
        right_value
    };
    Ok(df!(
        key => keys,
        left_value => left_out,
        right_name => right_out,
    )?)
}

/// First column other than the key; aggregate tables carry exactly one.
fn value_column_name(df: &DataFrame, key: &str) -> Result<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .find(|name| name != key)
        .ok_or_else(|| crate::error::AnalysisError::ColumnNotFound(format!("value column of '{key}' table")))
}

fn keyed_values(df: &DataFrame, key: &str, value: &str) -> Result<Vec<(String, i64)>> {
    let keys = utf8_column(df, key)?;
    let values = int_column(df, value)?;
    Ok(keys
        .into_iter()
        .zip(values)
        .filter_map(|(k, v)| Some((k?, v?)))
        .collect())
}
