#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/aedes-analytics/aedes/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod artifact;
pub mod builder;
pub mod export;

pub use artifact::{enumerate, sanitize_region, ArtifactKey, ArtifactKind, FactorAxis};
pub use builder::build_artifacts;
pub use export::{Artifact, ExportError, ExportSet, Result};
