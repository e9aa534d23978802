#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/aedes-analytics/aedes/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod panel;
pub mod schema;

pub use error::{DataError, Result};
pub use loader::{load_csv, load_reader};
pub use panel::{Observation, Panel};
