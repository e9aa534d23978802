//! Lagged Rainfall Feature
//!
//! Carries each region's rainfall forward by a configurable number of
//! months, capturing the delayed effect of rain on breeding sites. The
//! first observations of a region's series have no predecessor and stay
//! null; callers must handle the null, never assume zero.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use aedes_data::schema::{COL_MONTH, COL_RAINFALL, COL_REGION, COL_YEAR};

use crate::error::Result;
use crate::Feature;

/// Configuration for the rainfall lag feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LagConfig {
    /// Number of months to lag by (default: 1).
    pub periods: usize,
}

impl Default for LagConfig {
    fn default() -> Self {
        Self { periods: 1 }
    }
}

/// Rainfall lagged by `periods` months within each region series.
#[derive(Debug)]
pub struct RainfallLag {
    config: LagConfig,
    name: String,
}

impl RainfallLag {
    /// Create the feature from a configuration.
    pub fn with_config(config: LagConfig) -> Self {
        let name = format!("rain_lag{}", config.periods);
        Self { config, name }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &LagConfig {
        &self.config
    }
}

impl Default for RainfallLag {
    fn default() -> Self {
        Self::with_config(LagConfig::default())
    }
}

impl Feature for RainfallLag {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame> {
        let result = data
            .sort([COL_REGION, COL_YEAR, COL_MONTH], Default::default())
            .with_columns([col(COL_RAINFALL)
                .shift(lit(self.config.periods as i64))
                .over([col(COL_REGION)])
                .alias(&self.name)]);
        Ok(result)
    }

    fn required_columns(&self) -> &[&str] {
        &[COL_REGION, COL_YEAR, COL_MONTH, COL_RAINFALL]
    }
}
