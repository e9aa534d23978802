//! Idempotent, collision-checked artifact export.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::ArtifactKey;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Address of the manifest the exporter writes alongside the artifacts.
pub const MANIFEST_ADDRESS: &str = "manifest.json";

/// Errors that can occur while building or writing the artifact set.
#[derive(Debug, Error)]
pub enum ExportError {
    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Two distinct keys mapped to one address. Always a defect in the
    /// sanitization rule; never silently overwritten.
    #[error("address collision on '{address}'")]
    AddressCollision {
        /// The colliding address.
        address: String,
    },

    /// A model-dependent key was enumerated for an untrained partition.
    #[error("no trained model for partition '{partition}'")]
    MissingModel {
        /// Partition the key required.
        partition: String,
    },

    /// A region-keyed artifact key carried no region.
    #[error("region-keyed artifact without a region")]
    MissingRegion,

    /// The files on disk do not match the manifest after writing.
    #[error("exported set does not match the index: {missing} missing, {unexpected} unexpected")]
    IndexMismatch {
        /// Addresses in the manifest but absent on disk.
        missing: usize,
        /// Files on disk the manifest does not know.
        unexpected: usize,
    },
}

/// One artifact: a logical key plus its serialized payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// The logical key.
    pub key: ArtifactKey,
    /// The JSON payload.
    pub payload: serde_json::Value,
}

impl Artifact {
    /// The artifact's address.
    pub fn address(&self) -> String {
        self.key.address()
    }

    /// Serialize the payload to the bytes written to disk.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.payload)?)
    }
}

/// Reverse index over everything a run exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Number of artifact addresses (the manifest itself excluded).
    pub artifact_count: usize,
    /// Every artifact address, ascending.
    pub addresses: Vec<String>,
}

/// A collision-checked set of artifacts ready to write.
#[derive(Debug)]
pub struct ExportSet {
    artifacts: Vec<Artifact>,
    addresses: Vec<String>,
}

impl ExportSet {
    /// Build the set, verifying addresses are pairwise distinct.
    pub fn new(artifacts: Vec<Artifact>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for artifact in &artifacts {
            let address = artifact.address();
            if address == MANIFEST_ADDRESS || !seen.insert(address.clone()) {
                return Err(ExportError::AddressCollision { address });
            }
        }
        let addresses = seen.into_iter().collect();
        Ok(Self {
            artifacts,
            addresses,
        })
    }

    /// Number of artifacts in the set.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Every artifact address, ascending.
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// The manifest describing this set.
    pub fn manifest(&self) -> Manifest {
        Manifest {
            artifact_count: self.addresses.len(),
            addresses: self.addresses.clone(),
        }
    }

    /// Write the whole set into a directory, full-rebuild style.
    ///
    /// Any `*.json` already present is deleted first: a re-export over a
    /// smaller key space must not leave stale addresses behind. After
    /// writing, the directory is re-read and checked against the
    /// manifest; a mismatch is fatal.
    ///
    /// Writes are sequential on purpose: a single logical writer owns
    /// the address space.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)?;
            }
        }

        for artifact in &self.artifacts {
            fs::write(dir.join(artifact.address()), artifact.to_bytes()?)?;
        }
        fs::write(
            dir.join(MANIFEST_ADDRESS),
            serde_json::to_vec_pretty(&self.manifest())?,
        )?;

        self.verify_dir(dir)?;

        log::info!(
            "exported {} artifacts to {}",
            self.artifacts.len(),
            dir.display()
        );
        Ok(self.artifacts.len())
    }

    /// Assert the directory holds exactly this set plus the manifest.
    fn verify_dir(&self, dir: &Path) -> Result<()> {
        let mut expected: BTreeSet<String> = self.addresses.iter().cloned().collect();
        expected.insert(MANIFEST_ADDRESS.to_string());

        let mut on_disk = BTreeSet::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                on_disk.insert(name.to_string());
            }
        }

        let missing = expected.difference(&on_disk).count();
        let unexpected = on_disk.difference(&expected).count();
        if missing > 0 || unexpected > 0 {
            return Err(ExportError::IndexMismatch {
                missing,
                unexpected,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::artifact::{ArtifactKey, ArtifactKind};

    use super::*;

    fn artifact(kind: ArtifactKind, year: Option<i32>, payload: serde_json::Value) -> Artifact {
        Artifact {
            key: ArtifactKey {
                kind,
                region: None,
                year,
            },
            payload,
        }
    }

    fn temp_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("aedes-export-{name}-{}", std::process::id()))
    }

    #[test]
    fn duplicate_addresses_are_rejected() {
        let a = artifact(ArtifactKind::AvailableYears, None, json!({"years": [2020]}));
        let err = ExportSet::new(vec![a.clone(), a]).unwrap_err();
        assert!(matches!(err, ExportError::AddressCollision { .. }));
    }

    #[test]
    fn rewrite_is_byte_identical() {
        let dir = temp_dir("idempotent");
        let set = ExportSet::new(vec![
            artifact(ArtifactKind::AvailableYears, None, json!({"years": [2020, 2021]})),
            artifact(ArtifactKind::LineChart, Some(2020), json!({"labels": ["Januari"]})),
        ])
        .unwrap();

        set.write_to_dir(&dir).unwrap();
        let first = fs::read(dir.join("available-years.json")).unwrap();
        set.write_to_dir(&dir).unwrap();
        let second = fs::read(dir.join("available-years.json")).unwrap();
        assert_eq!(first, second);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn stale_addresses_are_removed_on_rebuild() {
        let dir = temp_dir("rebuild");
        let wide = ExportSet::new(vec![
            artifact(ArtifactKind::LineChart, Some(2020), json!({})),
            artifact(ArtifactKind::LineChart, Some(2021), json!({})),
        ])
        .unwrap();
        wide.write_to_dir(&dir).unwrap();
        assert!(dir.join("line-chart-data-year2021.json").exists());

        let narrow =
            ExportSet::new(vec![artifact(ArtifactKind::LineChart, Some(2020), json!({}))])
                .unwrap();
        narrow.write_to_dir(&dir).unwrap();
        assert!(!dir.join("line-chart-data-year2021.json").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn manifest_matches_written_files() {
        let dir = temp_dir("manifest");
        let set = ExportSet::new(vec![
            artifact(ArtifactKind::Statistics, None, json!({"total_cases": 1})),
            artifact(ArtifactKind::RawDataSummary, None, json!({"total_records": 1})),
        ])
        .unwrap();
        set.write_to_dir(&dir).unwrap();

        let manifest: Manifest =
            serde_json::from_slice(&fs::read(dir.join(MANIFEST_ADDRESS)).unwrap()).unwrap();
        assert_eq!(manifest.artifact_count, 2);
        for address in &manifest.addresses {
            assert!(dir.join(address).exists(), "missing {address}");
        }

        fs::remove_dir_all(&dir).ok();
    }
}
