//! Error types for feature engineering.

use thiserror::Error;

/// Result type for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors that can occur while deriving features.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// An input column a feature reads is absent from the frame.
    #[error("feature '{feature}' requires missing column '{column}'")]
    MissingColumn {
        /// Feature that needed the column.
        feature: String,
        /// The absent column.
        column: String,
    },

    /// Polars error while evaluating the feature expressions.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
