//! Error types for model training.

use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while preparing data or training a partition.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A partition has too few rows to train on. The partition is
    /// skipped; sibling partitions continue.
    #[error("partition '{partition}' has {rows} rows, fewer than the minimum {min_rows}")]
    InsufficientData {
        /// Partition that was rejected.
        partition: String,
        /// Rows available.
        rows: usize,
        /// Configured minimum.
        min_rows: usize,
    },

    /// Normalized feature importances failed the sum-to-one invariant.
    /// Fatal for the partition only.
    #[error("partition '{partition}' importances sum to {sum}, expected 1.0")]
    ImportanceSum {
        /// Partition whose model failed validation.
        partition: String,
        /// Actual importance sum.
        sum: f64,
    },

    /// A feature column named by the trainer is absent from the frame.
    #[error("feature column '{column}' not found in training frame")]
    MissingFeature {
        /// The absent column.
        column: String,
    },

    /// A label cell was null; labels are never imputed.
    #[error("null label in column '{column}'")]
    MissingValue {
        /// The label column.
        column: String,
    },

    /// Polars error while materializing the training matrix.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
