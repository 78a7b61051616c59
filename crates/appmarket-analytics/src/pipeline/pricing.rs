//! Price-anomaly filtering and the derived revenue column.

use crate::error::Result;
use crate::schema;
use polars::prelude::*;
use tracing::{debug, info};

/// Removes listings priced at or above a fixed cap.
///
/// Listings at extreme prices are data-entry anomalies (placeholder "joke"
/// pricing) rather than genuine commercial offerings. The boundary is
/// exclusive: a listing at exactly the cap is removed.
pub struct PriceFilter {
    cap: f64,
}

impl PriceFilter {
    pub fn new(cap: f64) -> Self {
        Self { cap }
    }

    /// Filter out rows whose price is `>= cap`. Returns the surviving frame
    /// and the number of rows removed.
    pub fn apply(&self, df: DataFrame) -> Result<(DataFrame, usize)> {
        let before = df.height();
        let prices = df
            .column(schema::PRICE)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let mask = prices.lt(self.cap)?;
        let filtered = df.filter(&mask)?;
        let removed = before - filtered.height();

        if removed > 0 {
            info!(
                "Removed {} listing(s) priced at or above {:.2}",
                removed, self.cap
            );
        } else {
            debug!("No listings at or above the {:.2} price cap", self.cap);
        }

        Ok((filtered, removed))
    }
}

/// Attach `Revenue_Estimate` = `Installs` x `Price`.
///
/// An estimate, not observed revenue: it assumes every install occurred at
/// the current listed price. Free listings get 0.0.
pub fn attach_revenue_estimate(mut df: DataFrame) -> Result<DataFrame> {
    let installs = df
        .column(schema::INSTALLS)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let price = df
        .column(schema::PRICE)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let revenue = (&installs * &price)?.with_name(schema::REVENUE_ESTIMATE.into());
    df.with_column(revenue)?;
    Ok(df)
}
