#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/aedes-analytics/aedes/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engineer;
pub mod error;
pub mod interaction;
pub mod lag;
pub mod rolling;

pub use engineer::{FeatureConfig, FeatureEngineer};
pub use error::{FeatureError, Result};
pub use interaction::RainDensityInteraction;
pub use lag::{LagConfig, RainfallLag};
pub use rolling::{RainfallRollingMean, RollingConfig};

use polars::prelude::LazyFrame;

/// A derived column over the region-ordered panel.
///
/// Mirrors the contract every engineered feature must satisfy: the
/// output column for month *m* of a region depends only on that region's
/// rows at months ≤ *m*.
pub trait Feature: std::fmt::Debug {
    /// Name of the derived output column.
    fn name(&self) -> &str;

    /// Append the derived column to the frame.
    fn compute(&self, data: LazyFrame) -> Result<LazyFrame>;

    /// Input columns this feature reads.
    fn required_columns(&self) -> &[&str];
}
