//! Rolling-Mean Rainfall Feature
//!
//! Trailing mean of rainfall over a fixed window within each region
//! series. Early observations with fewer than `window` predecessors use
//! the points that exist (partial window) rather than going null; this
//! matches the upstream dataset's published series and is relied on by
//! consumers.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use aedes_data::schema::{COL_MONTH, COL_RAINFALL, COL_REGION, COL_YEAR};

use crate::error::Result;
use crate::Feature;

/// Configuration for the rolling-mean rainfall feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingConfig {
    /// Trailing window size in months (default: 3).
    pub window: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self { window: 3 }
    }
}

/// Trailing rolling-mean rainfall within each region series.
#[derive(Debug)]
pub struct RainfallRollingMean {
    config: RollingConfig,
    name: String,
}

impl RainfallRollingMean {
    /// Create the feature from a configuration.
    pub fn with_config(config: RollingConfig) -> Self {
        let name = format!("rain_{}m_mean", config.window);
        Self { config, name }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &RollingConfig {
        &self.config
    }
}

impl Default for RainfallRollingMean {
    fn default() -> Self {
        Self::with_config(RollingConfig::default())
    }
}

impl Feature for RainfallRollingMean {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame> {
        let result = data
            .sort([COL_REGION, COL_YEAR, COL_MONTH], Default::default())
            .with_columns([col(COL_RAINFALL)
                .rolling_mean(RollingOptionsFixedWindow {
                    window_size: self.config.window,
                    min_periods: 1,
                    ..Default::default()
                })
                .over([col(COL_REGION)])
                .alias(&self.name)]);
        Ok(result)
    }

    fn required_columns(&self) -> &[&str] {
        &[COL_REGION, COL_YEAR, COL_MONTH, COL_RAINFALL]
    }
}
