//! App-Marketplace Listings Analytics
//!
//! A one-shot, in-memory cleaning and aggregation pipeline for scraped
//! mobile-app marketplace listings, built with Rust and Polars.
//!
//! # Overview
//!
//! This library provides:
//!
//! - **Loading**: CSV ingestion against a fixed listings schema
//! - **Cleaning**: column projection, incomplete-row removal, duplicate
//!   detection by the (name, type, price) identity key
//! - **Coercion**: parsing display-formatted install counts (`"1,000+"`)
//!   and prices (`"$4.99"`) into numeric columns, with an explicit policy
//!   for unparseable rows
//! - **Filtering/Derivation**: price-anomaly removal and the
//!   installs-times-price revenue estimate
//! - **Aggregation**: counts, sums, top-N lists, tie sets, genre explosion
//!   and keyed joins feeding chart-ready tables
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use appmarket_analytics::{Aggregator, Pipeline, PipelineConfig};
//!
//! let outcome = Pipeline::builder()
//!     .config(PipelineConfig::builder().price_cap(250.0).build()?)
//!     .build()?
//!     .run("apps.csv")?;
//!
//! let aggregator = Aggregator::new(&outcome.frame);
//! let by_category = aggregator.sum_by("Category", "Installs")?;
//! println!("{by_category}");
//! ```
//!
//! The pipeline runs to completion in one pass and holds the whole table in
//! memory; there is no incremental ingestion, persistence, or concurrency.

pub mod aggregate;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod types;

pub(crate) mod utils;

// Re-exports for convenient access
pub use aggregate::{Aggregator, explode_genres, inner_join_on_key};
pub use cleaner::coercion::{format_installs, parse_installs, parse_price};
pub use cleaner::{DataCleaner, FieldCoercer};
pub use config::{CoercionPolicy, ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use loader::load_table;
pub use pipeline::{Pipeline, PipelineBuilder, PriceFilter, attach_revenue_estimate};
pub use report::{AnalysisReport, ReportGenerator, ReportOptions};
pub use types::{AppType, PipelineOutcome, PipelineSummary};
