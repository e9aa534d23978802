//! Materializes every enumerated key into an artifact payload.

use std::collections::{BTreeMap, BTreeSet};

use aedes_data::Panel;
use aedes_model::{Partition, TrainedModel};

use crate::aggregate;
use crate::artifact::{enumerate, ArtifactKey, ArtifactKind};
use crate::export::{Artifact, ExportError, Result};

fn partition_of(key: &ArtifactKey) -> Partition {
    key.year.map_or(Partition::AllYears, Partition::Year)
}

/// Build the complete artifact set for a panel and its trained models.
///
/// The set covers exactly the keys [`enumerate`] yields; the match on
/// [`ArtifactKind`] is exhaustive, so a new kind cannot be added without
/// also deciding its payload here.
pub fn build_artifacts(
    panel: &Panel,
    models: &BTreeMap<Partition, TrainedModel>,
) -> Result<Vec<Artifact>> {
    let trained: BTreeSet<Partition> = models.keys().copied().collect();
    let keys = enumerate(panel, &trained);

    let model_for = |key: &ArtifactKey| -> Result<&TrainedModel> {
        let partition = partition_of(key);
        models
            .get(&partition)
            .ok_or_else(|| ExportError::MissingModel {
                partition: partition.to_string(),
            })
    };

    let mut artifacts = Vec::with_capacity(keys.len());
    for key in keys {
        let payload = match key.kind {
            ArtifactKind::MonthlyResults => {
                serde_json::to_value(aggregate::monthly_results(panel, key.year, model_for(&key)?))?
            }
            ArtifactKind::RegionalData => serde_json::to_value(aggregate::regional_summaries(
                panel,
                key.year,
                model_for(&key)?,
            ))?,
            ArtifactKind::FactorSummary => {
                serde_json::to_value(aggregate::factor_summary(model_for(&key)?))?
            }
            ArtifactKind::ModelInfo => {
                serde_json::to_value(aggregate::model_info(panel, model_for(&key)?))?
            }
            ArtifactKind::Statistics => {
                let monthly = aggregate::monthly_results(panel, key.year, model_for(&key)?);
                match aggregate::statistics(&monthly) {
                    Some(stats) => serde_json::to_value(stats)?,
                    // A constructed panel always has months; nothing to
                    // export if the scope is somehow empty.
                    None => continue,
                }
            }
            ArtifactKind::LineChart => serde_json::to_value(aggregate::line_chart(
                &aggregate::monthly_aggregates(panel, key.year),
            ))?,
            ArtifactKind::BarChart => serde_json::to_value(aggregate::bar_chart(
                &aggregate::monthly_results(panel, key.year, model_for(&key)?),
            ))?,
            ArtifactKind::FactorScatter(axis) => serde_json::to_value(aggregate::factor_scatter(
                &aggregate::monthly_aggregates(panel, key.year),
                axis,
            ))?,
            ArtifactKind::RegionRainfallScatter => {
                let region = key.region.as_deref().ok_or(ExportError::MissingRegion)?;
                serde_json::to_value(aggregate::region_rainfall_scatter(panel, region, key.year))?
            }
            ArtifactKind::PopulationScatter => {
                serde_json::to_value(aggregate::population_scatter(panel, key.year))?
            }
            ArtifactKind::RawData => serde_json::to_value(aggregate::raw_data(panel, key.year))?,
            ArtifactKind::RawDataSummary => {
                serde_json::to_value(aggregate::raw_data_summary(panel))?
            }
            ArtifactKind::AvailableYears => {
                serde_json::to_value(aggregate::available_years(panel))?
            }
            ArtifactKind::AvailableRegions => {
                serde_json::to_value(aggregate::available_regions(panel, key.year))?
            }
        };

        artifacts.push(Artifact { key, payload });
    }

    Ok(artifacts)
}
