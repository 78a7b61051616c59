//! Main analytics pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the cleaning workflow: structural cleaning, numeric
//! coercion, price-anomaly filtering, and the derived revenue column.

use crate::cleaner::{DataCleaner, FieldCoercer};
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::{Result, ResultExt};
use crate::loader;
use crate::pipeline::pricing::{PriceFilter, attach_revenue_estimate};
use crate::types::{PipelineOutcome, PipelineSummary};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// The cleaning and derivation pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom
/// configuration, or [`Pipeline::with_defaults()`] for the stock one.
///
/// # Example
///
/// ```rust,ignore
/// use appmarket_analytics::{Pipeline, PipelineConfig};
///
/// let outcome = Pipeline::builder()
///     .config(PipelineConfig::builder().price_cap(250.0).build()?)
///     .build()?
///     .run("apps.csv")?;
///
/// println!("{} listings retained", outcome.frame.height());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    cleaner: DataCleaner,
    coercer: FieldCoercer,
    price_filter: PriceFilter,
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// A pipeline with the default configuration.
    pub fn with_defaults() -> Self {
        Pipeline::builder()
            .build()
            .expect("default configuration is valid")
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the listings table from `path` and process it.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<PipelineOutcome> {
        let df = loader::load_table(path).context("loading stage")?;
        self.process(df)
    }

    /// Process an already-loaded listings table.
    ///
    /// Stages run in a fixed order; each one consumes the previous frame and
    /// produces a new one. Any stage error aborts the run with the stage
    /// named in the error context.
    pub fn process(&self, df: DataFrame) -> Result<PipelineOutcome> {
        let start_time = Instant::now();

        info!("Starting listings pipeline...");

        let mut summary = PipelineSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();

        // Step 1: structural cleaning (projection, completeness, dedup).
        info!("Step 1: Cleaning...");
        let (df, cleaning) = self.cleaner.clean(df).context("cleaning stage")?;
        summary.dropped_columns = cleaning.dropped_columns;
        summary.incomplete_rows_dropped = cleaning.incomplete_rows;
        summary.duplicate_rows_dropped = cleaning.duplicate_rows;
        for action in cleaning.actions {
            summary.add_action(action);
        }

        // Step 2: numeric coercion with explicit failure policy.
        info!("Step 2: Coercing numeric columns...");
        let (df, coercion) = self.coercer.coerce(df).context("coercion stage")?;
        summary.coercion_failures_dropped = coercion.rows_dropped;
        for action in coercion.actions {
            summary.add_action(action);
        }

        // Step 3: price-anomaly filter.
        info!("Step 3: Filtering price anomalies...");
        let (df, priced_out) = self.price_filter.apply(df).context("price filter stage")?;
        summary.priced_out_rows = priced_out;
        if priced_out > 0 {
            summary.add_action(format!(
                "Removed {} listing(s) priced at or above {:.2}",
                priced_out, self.config.price_cap
            ));
        }

        // Step 4: derived revenue column.
        info!("Step 4: Deriving revenue estimates...");
        let df = attach_revenue_estimate(df).context("derivation stage")?;
        summary.add_action("Attached revenue estimate column".to_string());

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        summary.rows_after = df.height();
        summary.columns_after = df.width();

        if summary.rows_removed_percentage() > 30.0 {
            summary.add_warning(format!(
                "High data loss: {:.1}% of rows were removed",
                summary.rows_removed_percentage()
            ));
        }
        if summary.rows_after == 0 {
            summary.add_warning("No rows survived the pipeline".to_string());
        }

        info!(
            "Pipeline complete: {} -> {} rows in {}ms",
            summary.rows_before, summary.rows_after, summary.duration_ms
        );
        debug!("Final shape: {:?}", (df.height(), df.width()));

        Ok(PipelineOutcome { frame: df, summary })
    }
}

/// Builder for creating a [`Pipeline`] instance.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let coercer = FieldCoercer::new(config.coercion_policy);
        let price_filter = PriceFilter::new(config.price_cap);

        Ok(Pipeline {
            config,
            cleaner: DataCleaner,
            coercer,
            price_filter,
        })
    }
}
