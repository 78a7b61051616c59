//! Integration tests for aggregate queries over a fully processed table.

use appmarket_analytics::{Aggregator, Pipeline, ReportGenerator, ReportOptions, load_table, schema};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// The processed subset: 7 listings, 5 free and 2 paid.
fn processed_subset() -> DataFrame {
    let df = load_table(fixtures_path().join("apps_subset.csv")).unwrap();
    Pipeline::with_defaults().process(df).unwrap().frame
}

fn utf8_values(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap().to_string())
        .collect()
}

fn i64_values(df: &DataFrame, name: &str) -> Vec<i64> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect()
}

#[test]
fn test_category_installs_sum_descending() {
    let frame = processed_subset();
    let sums = Aggregator::new(&frame)
        .sum_by(schema::CATEGORY, schema::INSTALLS)
        .unwrap();

    assert_eq!(
        utf8_values(&sums, schema::CATEGORY),
        vec!["ART_AND_DESIGN", "GAME", "TOOLS", "MEDICAL"]
    );
    assert_eq!(
        i64_values(&sums, schema::INSTALLS),
        vec![50_510_000, 15_000_000, 1_000_000, 10_000]
    );
}

#[test]
fn test_category_concentration_matches_counts_and_sums() {
    let frame = processed_subset();
    let concentration = Aggregator::new(&frame).category_concentration().unwrap();

    assert_eq!(
        utf8_values(&concentration, schema::CATEGORY),
        vec!["ART_AND_DESIGN", "GAME", "TOOLS", "MEDICAL"]
    );
    assert_eq!(i64_values(&concentration, schema::APPS), vec![3, 2, 1, 1]);
    assert_eq!(
        i64_values(&concentration, schema::INSTALLS),
        vec![50_510_000, 15_000_000, 1_000_000, 10_000]
    );
}

#[test]
fn test_genre_explosion_counts() {
    let frame = processed_subset();
    let aggregator = Aggregator::new(&frame);

    // 7 rows carry 10 genre tokens in total (three rows are multi-valued).
    let exploded = aggregator.exploded_genres().unwrap();
    assert_eq!(exploded.height(), 10);

    let frequency = aggregator.genre_frequency().unwrap();
    assert_eq!(utf8_values(&frequency, schema::GENRE)[0], "Art & Design");
    assert_eq!(i64_values(&frequency, schema::COUNT)[0], 3);
    // Every other token appears once.
    assert_eq!(frequency.height(), 8);
}

#[test]
fn test_free_vs_paid_split() {
    let frame = processed_subset();
    let split = Aggregator::new(&frame)
        .count_by_pair(schema::CATEGORY, schema::TYPE)
        .unwrap();

    let categories = utf8_values(&split, schema::CATEGORY);
    let types = utf8_values(&split, schema::TYPE);
    let counts = i64_values(&split, schema::COUNT);

    let mut pairs: Vec<(String, String, i64)> = categories
        .into_iter()
        .zip(types)
        .zip(counts)
        .map(|((c, t), n)| (c, t, n))
        .collect();
    pairs.sort();

    assert_eq!(
        pairs,
        vec![
            ("ART_AND_DESIGN".to_string(), "Free".to_string(), 3),
            ("GAME".to_string(), "Free".to_string(), 2),
            ("MEDICAL".to_string(), "Paid".to_string(), 1),
            ("TOOLS".to_string(), "Paid".to_string(), 1),
        ]
    );
}

#[test]
fn test_ties_at_max_rating_and_size() {
    let frame = processed_subset();
    let aggregator = Aggregator::new(&frame);

    let best_rated = aggregator.ties_at_max(schema::RATING).unwrap();
    assert_eq!(utf8_values(&best_rated, schema::APP), vec!["Tiny Scanner"]);

    let largest = aggregator.ties_at_max(schema::SIZE_MBS).unwrap();
    assert_eq!(utf8_values(&largest, schema::APP), vec!["Bubble Shooter"]);
}

#[test]
fn test_top_revenue_order() {
    let frame = processed_subset();
    let top = Aggregator::new(&frame)
        .top_n(schema::REVENUE_ESTIMATE, 3)
        .unwrap();

    let apps = utf8_values(&top, schema::APP);
    assert_eq!(apps[0], "Tiny Scanner"); // 1,000,000 x 4.99
    assert_eq!(apps[1], "Mega Anesthesia"); // 10,000 x 79.99
}

#[test]
fn test_most_reviewed_order() {
    let frame = processed_subset();
    let top = Aggregator::new(&frame).top_n(schema::REVIEWS, 3).unwrap();
    assert_eq!(
        utf8_values(&top, schema::APP),
        vec!["Sketch It", "Bubble Shooter", "Word Puzzle"]
    );
}

#[test]
fn test_full_report_over_subset() {
    let df = load_table(fixtures_path().join("apps_subset.csv")).unwrap();
    let outcome = Pipeline::with_defaults().process(df).unwrap();
    let report =
        ReportGenerator::build_report("apps_subset.csv", &outcome, &ReportOptions::default())
            .unwrap();

    assert_eq!(report.summary.rows_after, 7);

    // Content ratings: 6 Everyone, 1 Teen.
    assert_eq!(report.content_rating_counts[0].label, "Everyone");
    assert_eq!(report.content_rating_counts[0].count, 6);
    assert_eq!(report.content_rating_counts[1].label, "Teen");
    assert_eq!(report.content_rating_counts[1].count, 1);

    // Two paid listings; median of 4.99 and 79.99.
    assert_eq!(report.paid_apps.len(), 2);
    let median = report.median_paid_price.unwrap();
    assert!((median - 42.49).abs() < 1e-9);

    // The installs-by-type table carries one row per listing.
    assert_eq!(report.installs_by_type.len(), 7);
    assert_eq!(
        report
            .installs_by_type
            .iter()
            .filter(|row| row.listing_type == "Paid")
            .count(),
        2
    );

    // Concentration table only holds categories present on both sides of
    // the join, which here is all of them.
    assert_eq!(report.category_concentration.len(), 4);
}
