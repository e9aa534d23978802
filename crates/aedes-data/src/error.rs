//! Error types for dataset loading and panel validation.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or validating the panel.
///
/// Every variant is fatal for the whole run: the loader never yields a
/// partially valid panel.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required column is missing from the source header.
    #[error("missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A numeric column holds a value that does not parse as a number.
    #[error("non-numeric value '{value}' in column '{column}' at line {line}")]
    NonNumeric {
        /// Column holding the offending value.
        column: String,
        /// Raw cell content.
        value: String,
        /// 1-based source line (header is line 1).
        line: u64,
    },

    /// Two rows share the same (region, year, month) key.
    #[error("duplicate observation for region '{region}' at {year}-{month:02}")]
    DuplicateKey {
        /// Region of the duplicated observation.
        region: String,
        /// Year of the duplicated observation.
        year: i32,
        /// Month of the duplicated observation.
        month: u32,
    },

    /// A month value outside 1..=12.
    #[error("month {month} out of range at line {line}")]
    MonthOutOfRange {
        /// Offending month value.
        month: i64,
        /// 1-based source line.
        line: u64,
    },

    /// A year value outside the plausible range.
    #[error("year {year} out of range at line {line}")]
    YearOutOfRange {
        /// Offending year value.
        year: i64,
        /// 1-based source line.
        line: u64,
    },

    /// A negative value in a column constrained to be non-negative.
    #[error("negative value {value} in column '{column}' at line {line}")]
    NegativeValue {
        /// Column holding the offending value.
        column: String,
        /// Offending value.
        value: f64,
        /// 1-based source line.
        line: u64,
    },

    /// A region's monthly series has a hole inside an observed year.
    #[error("gap in series for region '{region}': expected {year}-{month:02}")]
    SeriesGap {
        /// Region whose series is broken.
        region: String,
        /// Year of the first missing month.
        year: i32,
        /// First missing month.
        month: u32,
    },

    /// The source parsed to zero observations.
    #[error("dataset contains no observations")]
    EmptyDataset,

    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error while bridging the panel into a DataFrame.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
