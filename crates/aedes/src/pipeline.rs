//! Whole-run orchestration: load, engineer, train, aggregate, export.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aedes_data::schema::{COL_MONTHLY_CASES, COL_YEAR};
use aedes_data::{load_csv, DataError, Panel};
use aedes_export::{build_artifacts, ExportError, ExportSet};
use aedes_features::{FeatureConfig, FeatureEngineer, FeatureError};
use aedes_model::{
    train_partition, Dataset, ModelError, Partition, TrainedModel, TrainerConfig,
};

/// Every knob of a pipeline run, passed in explicitly. Stages never read
/// ambient state, so two runs with equal configs and equal input are
/// byte-identical.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Feature-engineering knobs.
    pub features: FeatureConfig,
    /// Training knobs, seeds included.
    pub trainer: TrainerConfig,
}

/// Errors that abort a pipeline run.
///
/// Per-partition training failures are not here: those degrade into
/// [`RunSummary::partitions_skipped`] entries instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading or validating the panel failed.
    #[error("data error: {0}")]
    Data(#[from] DataError),

    /// Feature engineering failed.
    #[error("feature error: {0}")]
    Feature(#[from] FeatureError),

    /// Training failed for a reason that is not a per-partition skip.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Building or writing the artifact set failed.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Polars error while scoping the feature frame.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// A partition the run trained nothing for, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPartition {
    /// Partition that was skipped.
    pub partition: String,
    /// Human-readable reason, straight from the model error.
    pub reason: String,
}

/// What a run did, for reporting. Skips are surfaced here, never
/// swallowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Observations in the loaded panel.
    pub observations: usize,
    /// Distinct regions in the panel.
    pub regions: usize,
    /// Realized years, ascending.
    pub years: Vec<i32>,
    /// Partitions that trained, in order.
    pub partitions_trained: Vec<String>,
    /// Partitions that were skipped, with reasons.
    pub partitions_skipped: Vec<SkippedPartition>,
    /// Artifacts written (manifest excluded).
    pub artifacts_written: usize,
}

/// Run the full pipeline: CSV in, artifact directory out.
///
/// Loader and export failures abort before/without partial output;
/// per-partition [`ModelError::InsufficientData`] and
/// [`ModelError::ImportanceSum`] drop that partition's model-dependent
/// artifacts and continue.
pub fn run(
    csv_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<RunSummary, PipelineError> {
    let panel = load_csv(csv_path)?;
    run_on_panel(&panel, out_dir, config)
}

/// Run every stage after loading on an already-validated panel.
pub fn run_on_panel(
    panel: &Panel,
    out_dir: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<RunSummary, PipelineError> {
    let engineer = FeatureEngineer::new(&config.features);
    let frame = engineer.apply(panel.to_frame()?)?;

    let mut partitions = vec![Partition::AllYears];
    partitions.extend(panel.years().into_iter().map(Partition::Year));

    // Partitions share no mutable state; train them concurrently. Each
    // result is deterministic in its own seed, so scheduling order never
    // shows up in the artifacts.
    let outcomes: Vec<(Partition, Result<TrainedModel, PipelineError>)> = partitions
        .par_iter()
        .map(|&partition| (partition, train_scope(&frame, partition, &engineer, config)))
        .collect();

    let mut models: BTreeMap<Partition, TrainedModel> = BTreeMap::new();
    let mut skipped = Vec::new();
    for (partition, outcome) in outcomes {
        match outcome {
            Ok(model) => {
                log::info!(
                    "trained partition {partition}: {} rows, test R² {:.4}",
                    model.n_samples,
                    model.test_r2
                );
                models.insert(partition, model);
            }
            Err(PipelineError::Model(err))
                if matches!(
                    err,
                    ModelError::InsufficientData { .. } | ModelError::ImportanceSum { .. }
                ) =>
            {
                log::warn!("skipping partition {partition}: {err}");
                skipped.push(SkippedPartition {
                    partition: partition.to_string(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    let artifacts = build_artifacts(panel, &models)?;
    let set = ExportSet::new(artifacts)?;
    let artifacts_written = set.write_to_dir(out_dir)?;

    Ok(RunSummary {
        observations: panel.len(),
        regions: panel.regions().len(),
        years: panel.years(),
        partitions_trained: models.keys().map(Partition::to_string).collect(),
        partitions_skipped: skipped,
        artifacts_written,
    })
}

/// Scope the feature frame to one partition and train it.
fn train_scope(
    frame: &DataFrame,
    partition: Partition,
    engineer: &FeatureEngineer,
    config: &PipelineConfig,
) -> Result<TrainedModel, PipelineError> {
    let dataset = match partition {
        Partition::AllYears => {
            Dataset::from_frame(frame, engineer.feature_columns(), COL_MONTHLY_CASES)?
        }
        Partition::Year(year) => {
            let scoped = frame
                .clone()
                .lazy()
                .filter(col(COL_YEAR).eq(lit(year)))
                .collect()?;
            Dataset::from_frame(&scoped, engineer.feature_columns(), COL_MONTHLY_CASES)?
        }
    };

    Ok(train_partition(&dataset, partition, &config.trainer)?)
}
