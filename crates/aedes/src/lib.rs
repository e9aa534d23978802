#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/aedes-analytics/aedes/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;

// Re-export main types from sub-crates
pub use aedes_data as data;
pub use aedes_export as export;
pub use aedes_features as features;
pub use aedes_model as model;

pub use pipeline::{run, PipelineConfig, PipelineError, RunSummary, SkippedPartition};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
