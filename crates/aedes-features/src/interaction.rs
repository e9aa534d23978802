//! Rainfall × Density Interaction Feature
//!
//! Pointwise product of rainfall and population density. Nulls propagate
//! only from the operands themselves; no additional masking.

use polars::prelude::*;

use aedes_data::schema::{COL_DENSITY, COL_RAINFALL};

use crate::error::Result;
use crate::Feature;

/// Output column of the interaction feature.
pub const RAIN_X_DENSITY: &str = "rain_x_density";

/// Pointwise rainfall × population-density interaction.
#[derive(Debug, Default)]
pub struct RainDensityInteraction;

impl Feature for RainDensityInteraction {
    fn name(&self) -> &str {
        RAIN_X_DENSITY
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame> {
        let result = data
            .with_columns([(col(COL_RAINFALL) * col(COL_DENSITY)).alias(RAIN_X_DENSITY)]);
        Ok(result)
    }

    fn required_columns(&self) -> &[&str] {
        &[COL_RAINFALL, COL_DENSITY]
    }
}
