//! Configuration types for the analytics pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Policy for rows whose `Installs` or `Price` value cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CoercionPolicy {
    /// Remove the offending rows and record how many were dropped.
    #[default]
    DropRows,
    /// Abort the run, reporting the offending row indices.
    Fail,
}

/// Configuration for the analytics pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration with a
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use appmarket_analytics::config::{CoercionPolicy, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .price_cap(250.0)
///     .coercion_policy(CoercionPolicy::Fail)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Exclusive upper bound on listing price; rows at or above it are
    /// treated as data-entry anomalies and removed.
    /// Default: 250.0
    pub price_cap: f64,

    /// Policy for rows that fail numeric coercion.
    /// Default: DropRows
    pub coercion_policy: CoercionPolicy,

    /// Delimiter between genre tags in the `Genres` column.
    /// Default: ';'
    pub genre_delimiter: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            price_cap: 250.0,
            coercion_policy: CoercionPolicy::default(),
            genre_delimiter: ';',
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.price_cap.is_finite() || self.price_cap <= 0.0 {
            return Err(ConfigValidationError::InvalidPriceCap {
                value: self.price_cap,
            });
        }
        if self.genre_delimiter.is_alphanumeric() {
            return Err(ConfigValidationError::InvalidDelimiter {
                value: self.genre_delimiter,
            });
        }
        Ok(())
    }
}

/// Validation errors for [`PipelineConfig`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("price_cap must be a finite positive number, got {value}")]
    InvalidPriceCap { value: f64 },

    #[error("genre_delimiter must not be alphanumeric, got '{value}'")]
    InvalidDelimiter { value: char },
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Default, Clone)]
pub struct PipelineConfigBuilder {
    price_cap: Option<f64>,
    coercion_policy: Option<CoercionPolicy>,
    genre_delimiter: Option<char>,
}

impl PipelineConfigBuilder {
    /// Set the exclusive price cap.
    pub fn price_cap(mut self, cap: f64) -> Self {
        self.price_cap = Some(cap);
        self
    }

    /// Set the coercion failure policy.
    pub fn coercion_policy(mut self, policy: CoercionPolicy) -> Self {
        self.coercion_policy = Some(policy);
        self
    }

    /// Set the genre tag delimiter.
    pub fn genre_delimiter(mut self, delimiter: char) -> Self {
        self.genre_delimiter = Some(delimiter);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            price_cap: self.price_cap.unwrap_or(defaults.price_cap),
            coercion_policy: self.coercion_policy.unwrap_or(defaults.coercion_policy),
            genre_delimiter: self.genre_delimiter.unwrap_or(defaults.genre_delimiter),
        };
        config.validate()?;
        Ok(config)
    }
}
