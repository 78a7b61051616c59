//! Pipeline module.
//!
//! This module provides the main analytics pipeline and its stages.

mod builder;
pub mod pricing;

pub use builder::{Pipeline, PipelineBuilder};
pub use pricing::{PriceFilter, attach_revenue_estimate};
