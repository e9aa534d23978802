//! Artifact keys, addressing, and key-space enumeration.
//!
//! The exportable key space is a set of `(kind, region?, year?)` tuples
//! computed from what the panel actually contains, never from nested
//! loops over assumed ranges. Every realized combination maps to exactly
//! one key; combinations absent from the data produce no key at all.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use aedes_data::Panel;
use aedes_model::Partition;

/// Covariate axes a scatter artifact can be keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorAxis {
    /// Monthly rainfall (mm).
    Rainfall,
    /// Population density (per km²).
    PopulationDensity,
}

impl FactorAxis {
    /// Every axis, in export order.
    pub const ALL: [Self; 2] = [Self::Rainfall, Self::PopulationDensity];

    /// Address fragment for this axis.
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Rainfall => "rainfall",
            Self::PopulationDensity => "population_density",
        }
    }
}

/// Every kind of artifact the pipeline exports.
///
/// A closed enum on purpose: the enumeration below matches on it
/// exhaustively, so adding a kind without wiring its key space and
/// payload is a compile error, not a missing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Month-by-month aggregates with ranked factors.
    MonthlyResults,
    /// Per-region totals with the dominant factor.
    RegionalData,
    /// All factors ranked with descriptions.
    FactorSummary,
    /// Model metadata and fit scores.
    ModelInfo,
    /// Global statistics and extrema.
    Statistics,
    /// Case/rainfall line-chart series.
    LineChart,
    /// Factor-importance bar-chart series.
    BarChart,
    /// Cases against one covariate axis.
    FactorScatter(FactorAxis),
    /// Cases against rainfall for one region.
    RegionRainfallScatter,
    /// Cases against density, one series per region.
    PopulationScatter,
    /// The raw observations.
    RawData,
    /// Coverage summary of the raw observations.
    RawDataSummary,
    /// Reverse index: years with artifacts.
    AvailableYears,
    /// Reverse index: regions with artifacts.
    AvailableRegions,
}

impl ArtifactKind {
    /// Address stem for this kind.
    pub fn slug(&self) -> String {
        match self {
            Self::MonthlyResults => "monthly-results".to_string(),
            Self::RegionalData => "regional-data".to_string(),
            Self::FactorSummary => "factor-summary".to_string(),
            Self::ModelInfo => "model-info".to_string(),
            Self::Statistics => "statistics".to_string(),
            Self::LineChart => "line-chart-data".to_string(),
            Self::BarChart => "bar-chart-data".to_string(),
            Self::FactorScatter(axis) => format!("scatter-plot-{}", axis.slug()),
            Self::RegionRainfallScatter => "scatter-rainfall-by-region".to_string(),
            Self::PopulationScatter => "scatter-population-all-regions".to_string(),
            Self::RawData => "raw-data".to_string(),
            Self::RawDataSummary => "raw-data-summary".to_string(),
            Self::AvailableYears => "available-years".to_string(),
            Self::AvailableRegions => "available-regions".to_string(),
        }
    }
}

/// Replace each space and `/` in a region name with `-`.
///
/// This is the entire sanitization rule; no other character is altered.
/// Region names never end in a bare number, and the year suffix is the
/// self-delimiting `-year{year}` form, so distinct keys cannot collide.
pub fn sanitize_region(region: &str) -> String {
    region
        .chars()
        .map(|c| if c == ' ' || c == '/' { '-' } else { c })
        .collect()
}

/// The logical key of one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactKey {
    /// What the artifact holds.
    pub kind: ArtifactKind,
    /// Region scope, when the kind is region-keyed.
    pub region: Option<String>,
    /// Year scope; `None` is the unfiltered default variant.
    pub year: Option<i32>,
}

impl ArtifactKey {
    /// Key for an unfiltered, unkeyed artifact.
    pub const fn global(kind: ArtifactKind) -> Self {
        Self {
            kind,
            region: None,
            year: None,
        }
    }

    /// Key for a year-scoped artifact.
    pub const fn for_year(kind: ArtifactKind, year: i32) -> Self {
        Self {
            kind,
            region: None,
            year: Some(year),
        }
    }

    /// The address this key serializes to: a pure function of the key,
    /// `{kind}[-{region-sanitized}][-year{year}].json`.
    pub fn address(&self) -> String {
        let mut address = self.kind.slug();
        if let Some(region) = &self.region {
            address.push('-');
            address.push_str(&sanitize_region(region));
        }
        if let Some(year) = self.year {
            address.push_str(&format!("-year{year}"));
        }
        address.push_str(".json");
        address
    }
}

/// Enumerate the complete key space for a panel and the partitions that
/// actually trained.
///
/// Model-dependent kinds are keyed only by trained partitions; data-only
/// kinds cover every realized year. Region-keyed kinds cover exactly the
/// realized (region, year) pairs plus one all-years key per region.
pub fn enumerate(panel: &Panel, trained: &BTreeSet<Partition>) -> Vec<ArtifactKey> {
    let years = panel.years();
    let has_global_model = trained.contains(&Partition::AllYears);
    let year_trained = |year: i32| trained.contains(&Partition::Year(year));

    let mut keys = Vec::new();

    // Factor-ranked kinds follow the trained partition set.
    for kind in [
        ArtifactKind::MonthlyResults,
        ArtifactKind::RegionalData,
        ArtifactKind::BarChart,
    ] {
        if has_global_model {
            keys.push(ArtifactKey::global(kind));
        }
        for &year in &years {
            if year_trained(year) {
                keys.push(ArtifactKey::for_year(kind, year));
            }
        }
    }

    // Whole-panel, model-backed singletons.
    if has_global_model {
        keys.push(ArtifactKey::global(ArtifactKind::FactorSummary));
        keys.push(ArtifactKey::global(ArtifactKind::ModelInfo));
        keys.push(ArtifactKey::global(ArtifactKind::Statistics));
    }

    // Data-only kinds cover every realized year plus the default variant.
    let mut data_kinds = vec![ArtifactKind::LineChart];
    for axis in FactorAxis::ALL {
        data_kinds.push(ArtifactKind::FactorScatter(axis));
    }
    data_kinds.push(ArtifactKind::PopulationScatter);
    data_kinds.push(ArtifactKind::RawData);
    data_kinds.push(ArtifactKind::AvailableRegions);
    for kind in data_kinds {
        keys.push(ArtifactKey::global(kind));
        for &year in &years {
            keys.push(ArtifactKey::for_year(kind, year));
        }
    }

    // Region-keyed scatters: one per region, one per realized pair.
    for region in panel.regions() {
        keys.push(ArtifactKey {
            kind: ArtifactKind::RegionRainfallScatter,
            region: Some(region),
            year: None,
        });
    }
    for (region, year) in panel.region_years() {
        keys.push(ArtifactKey {
            kind: ArtifactKind::RegionRainfallScatter,
            region: Some(region),
            year: Some(year),
        });
    }

    // Singletons independent of any model.
    keys.push(ArtifactKey::global(ArtifactKind::RawDataSummary));
    keys.push(ArtifactKey::global(ArtifactKind::AvailableYears));

    keys
}
