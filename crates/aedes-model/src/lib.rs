#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/aedes-analytics/aedes/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dataset;
pub mod error;
pub mod forest;
pub mod trainer;
pub mod tree;

pub use dataset::{Dataset, Split};
pub use error::{ModelError, Result};
pub use forest::{ForestConfig, RandomForest};
pub use trainer::{
    train_partition, FeatureImportance, Partition, TrainedModel, TrainerConfig,
    DEFAULT_MIN_PARTITION_ROWS, IMPORTANCE_TOLERANCE,
};
pub use tree::{RegressionTree, TreeConfig};
