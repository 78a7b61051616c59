//! One-to-many expansion of the multi-valued `Genres` column.
//!
//! Each listing carries 1..N genre tags joined by a delimiter. Exploding
//! turns every tag into its own observation, keeping an explicit
//! back-reference to the source row so later joins can recover the listing.

use crate::error::Result;
use crate::schema;
use crate::utils::utf8_column;
use polars::prelude::*;

/// Split the `Genres` column into one observation per token.
///
/// The output table has a `Source_Row` back-reference and a `Genre` token
/// column. Tokens are trimmed; empty tokens (from doubled or trailing
/// delimiters) are skipped, so the output size equals the sum of non-empty
/// token counts per row, not the row count.
pub fn explode_genres(frame: &DataFrame, delimiter: char) -> Result<DataFrame> {
    let genres = utf8_column(frame, schema::GENRES)?;

    let mut source_rows: Vec<u32> = Vec::with_capacity(genres.len());
    let mut tokens: Vec<String> = Vec::with_capacity(genres.len());

    for (idx, value) in genres.iter().enumerate() {
        let Some(value) = value else { continue };
        for token in value.split(delimiter) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            source_rows.push(idx as u32);
            tokens.push(token.to_string());
        }
    }

    Ok(df!(
        schema::SOURCE_ROW => source_rows,
        schema::GENRE => tokens,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_genres(values: &[Option<&str>]) -> DataFrame {
        let column: Vec<Option<String>> = values
            .iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect();
        df!(schema::GENRES => column).unwrap()
    }

    #[test]
    fn test_multi_valued_row_yields_one_observation_per_token() {
        let df = frame_with_genres(&[Some("Action;Adventure"), Some("Casual")]);
        let exploded = explode_genres(&df, ';').unwrap();

        assert_eq!(exploded.height(), 3);

        let tokens = exploded
            .column(schema::GENRE)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(tokens, vec!["Action", "Adventure", "Casual"]);

        let sources = exploded
            .column(schema::SOURCE_ROW)
            .unwrap()
            .as_materialized_series()
            .u32()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(sources, vec![0, 0, 1]);
    }

    #[test]
    fn test_exploded_size_is_token_count_sum() {
        let df = frame_with_genres(&[
            Some("Action;Adventure;Education"),
            Some("Tools"),
            Some("Casual;Pretend Play"),
        ]);
        let exploded = explode_genres(&df, ';').unwrap();
        assert_eq!(exploded.height(), 3 + 1 + 2);
    }

    #[test]
    fn test_tokens_are_trimmed_and_empties_skipped() {
        let df = frame_with_genres(&[Some(" Action ; ;Adventure;")]);
        let exploded = explode_genres(&df, ';').unwrap();

        let tokens = exploded
            .column(schema::GENRE)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(tokens, vec!["Action", "Adventure"]);
    }

    #[test]
    fn test_null_rows_contribute_nothing() {
        let df = frame_with_genres(&[None, Some("Tools")]);
        let exploded = explode_genres(&df, ';').unwrap();
        assert_eq!(exploded.height(), 1);
    }
}
