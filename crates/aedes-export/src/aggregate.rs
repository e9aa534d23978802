//! Pure aggregation over the panel and trained models.
//!
//! Everything here is a function of its arguments: no model is ever
//! retrained, no ambient state is read, and iteration orders are pinned
//! (months ascend, regions sort lexically, factor ties break on name) so
//! payloads are stable byte-for-byte across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use aedes_data::schema::{self, REQUIRED_COLUMNS};
use aedes_data::{Observation, Panel};
use aedes_model::TrainedModel;

use crate::artifact::FactorAxis;

/// Dashboard display names for the engineered features.
const FACTOR_NAMES: [(&str, &str); 6] = [
    ("jumlah_curah_hujan", "Curah Hujan"),
    ("rain_lag1", "Curah Hujan (Bulan Lalu)"),
    ("rain_3m_mean", "Rata-rata Curah Hujan 3 Bulan"),
    ("kepadatan_penduduk", "Kepadatan Penduduk"),
    ("rain_x_density", "Interaksi Hujan & Kepadatan"),
    ("bulan", "Musim (Bulan)"),
];

const FACTOR_DESCRIPTIONS: [(&str, &str); 6] = [
    (
        "jumlah_curah_hujan",
        "Jumlah curah hujan bulanan yang mempengaruhi perkembangbiakan nyamuk",
    ),
    ("rain_lag1", "Curah hujan bulan sebelumnya (efek tertunda)"),
    ("rain_3m_mean", "Rata-rata curah hujan dalam 3 bulan terakhir"),
    (
        "kepadatan_penduduk",
        "Jumlah penduduk per km² yang mempengaruhi penyebaran",
    ),
    (
        "rain_x_density",
        "Interaksi antara curah hujan dan kepadatan penduduk",
    ),
    ("bulan", "Pengaruh musim berdasarkan bulan dalam setahun"),
];

/// Model type string every metadata artifact reports.
pub const MODEL_TYPE: &str = "Random Forest Regressor";

/// Dashboard display name of a feature column; unknown columns pass
/// through unchanged.
pub fn factor_display_name(feature: &str) -> &str {
    FACTOR_NAMES
        .iter()
        .find(|(key, _)| *key == feature)
        .map_or(feature, |(_, name)| *name)
}

fn factor_description(feature: &str) -> &str {
    FACTOR_DESCRIPTIONS
        .iter()
        .find(|(key, _)| *key == feature)
        .map_or("Deskripsi tidak tersedia", |(_, description)| *description)
}

/// Population density formatted to roughly three significant figures:
/// values from 100 upward round to whole numbers, smaller values keep
/// enough decimals to stay readable.
pub fn format_population_density(value: f64) -> f64 {
    if value >= 100.0 {
        value.round()
    } else if value >= 10.0 {
        round_to(value, 1)
    } else if value >= 1.0 {
        round_to(value, 2)
    } else {
        round_to(value, 3)
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn scoped<'a>(panel: &'a Panel, year: Option<i32>) -> Vec<&'a Observation> {
    panel
        .observations()
        .iter()
        .filter(|o| year.is_none_or(|y| o.year == y))
        .collect()
}

// ---------------------------------------------------------------------
// Monthly aggregates
// ---------------------------------------------------------------------

/// Model-free month-level aggregate over a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    /// Month number, 1..=12.
    pub month_number: u32,
    /// Indonesian month name.
    pub month: String,
    /// Year scope; null for the unfiltered variant.
    pub year: Option<i32>,
    /// Cases summed over every region in scope.
    pub total_cases: u64,
    /// Mean rainfall over the scope, 2 decimals.
    pub rainfall_mm: f64,
    /// Mean population density, significant-figure formatted.
    pub population_density: f64,
}

/// Aggregate each observed month over the scope. Months nobody observed
/// are absent, not zero-filled.
pub fn monthly_aggregates(panel: &Panel, year: Option<i32>) -> Vec<MonthlyAggregate> {
    let rows = scoped(panel, year);
    let mut aggregates = Vec::new();

    for month in 1..=12u32 {
        let in_month: Vec<&&Observation> = rows.iter().filter(|o| o.month == month).collect();
        if in_month.is_empty() {
            continue;
        }

        let n = in_month.len() as f64;
        let total_cases = in_month.iter().map(|o| o.monthly_cases as u64).sum();
        let rainfall = in_month.iter().map(|o| o.rainfall_mm).sum::<f64>() / n;
        let density = in_month.iter().map(|o| o.population_density).sum::<f64>() / n;

        aggregates.push(MonthlyAggregate {
            month_number: month,
            month: schema::month_name(month).unwrap_or_default().to_string(),
            year,
            total_cases,
            rainfall_mm: round_to(rainfall, 2),
            population_density: format_population_density(density),
        });
    }

    aggregates
}

/// Month-level record with the scope model's ranked factors attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyResult {
    /// Indonesian month name.
    pub month: String,
    /// Year scope; null for the unfiltered variant.
    pub year: Option<i32>,
    /// Cases summed over every region in scope.
    pub total_cases: u64,
    /// Display name of the top-ranked factor.
    pub most_influential_factor: String,
    /// Importance of the top factor.
    pub factor_importance: f64,
    /// Display name of the second factor.
    pub secondary_factor: String,
    /// Importance of the second factor.
    pub secondary_importance: f64,
    /// Display name of the third factor.
    pub tertiary_factor: String,
    /// Importance of the third factor.
    pub tertiary_importance: f64,
    /// Mean rainfall over the scope, 2 decimals.
    pub rainfall_mm: f64,
    /// Mean population density, significant-figure formatted.
    pub population_density: f64,
    /// Held-out R² of the scope model.
    pub prediction_accuracy: f64,
}

/// Join the monthly aggregates with the scope model's top factors.
pub fn monthly_results(
    panel: &Panel,
    year: Option<i32>,
    model: &TrainedModel,
) -> Vec<MonthlyResult> {
    let top = model.top_factors(3);
    let factor_at = |i: usize| -> (String, f64) {
        top.get(i).map_or_else(
            || ("N/A".to_string(), 0.0),
            |f| (factor_display_name(&f.name).to_string(), f.importance),
        )
    };
    let (primary, primary_importance) = factor_at(0);
    let (secondary, secondary_importance) = factor_at(1);
    let (tertiary, tertiary_importance) = factor_at(2);
    let accuracy = round_to(model.test_r2, 4);

    monthly_aggregates(panel, year)
        .into_iter()
        .map(|aggregate| MonthlyResult {
            month: aggregate.month,
            year: aggregate.year,
            total_cases: aggregate.total_cases,
            most_influential_factor: primary.clone(),
            factor_importance: primary_importance,
            secondary_factor: secondary.clone(),
            secondary_importance,
            tertiary_factor: tertiary.clone(),
            tertiary_importance,
            rainfall_mm: aggregate.rainfall_mm,
            population_density: aggregate.population_density,
            prediction_accuracy: accuracy,
        })
        .collect()
}

// ---------------------------------------------------------------------
// Regional aggregates
// ---------------------------------------------------------------------

/// Per-region totals with the scope model's dominant factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalSummary {
    /// District / city name.
    pub region: String,
    /// Cases summed over the scope.
    pub total_cases: u64,
    /// Display name of the scope model's top factor.
    pub dominant_factor: String,
    /// Importance of that factor.
    pub factor_importance: f64,
    /// Density of the region, significant-figure formatted.
    pub population_density: f64,
    /// Mean rainfall over the scope, 2 decimals.
    pub avg_rainfall: f64,
}

/// Summarize every region observed in the scope, sorted by name.
pub fn regional_summaries(
    panel: &Panel,
    year: Option<i32>,
    model: &TrainedModel,
) -> Vec<RegionalSummary> {
    let (dominant_factor, factor_importance) = model.top_factors(1).first().map_or_else(
        || ("N/A".to_string(), 0.0),
        |f| (factor_display_name(&f.name).to_string(), f.importance),
    );

    let mut by_region: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for obs in scoped(panel, year) {
        by_region.entry(obs.region.as_str()).or_default().push(obs);
    }

    by_region
        .into_iter()
        .map(|(region, rows)| {
            let n = rows.len() as f64;
            let total_cases = rows.iter().map(|o| o.monthly_cases as u64).sum();
            let rainfall = rows.iter().map(|o| o.rainfall_mm).sum::<f64>() / n;
            // Density is constant per region; take the first row's value.
            let density = rows[0].population_density;

            RegionalSummary {
                region: region.to_string(),
                total_cases,
                dominant_factor: dominant_factor.clone(),
                factor_importance,
                population_density: format_population_density(density),
                avg_rainfall: round_to(rainfall, 2),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------
// Model metadata
// ---------------------------------------------------------------------

/// One factor's entry in the summary artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorDetail {
    /// Display name.
    pub name: String,
    /// Importance over the whole-panel model.
    pub avg_importance: f64,
    /// Indonesian description of the factor.
    pub description: String,
}

/// Every factor ranked with display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSummary {
    /// Ranked factor entries.
    pub factors: Vec<FactorDetail>,
}

/// Build the factor summary from a model's full ranking.
pub fn factor_summary(model: &TrainedModel) -> FactorSummary {
    FactorSummary {
        factors: model
            .importance
            .iter()
            .map(|f| FactorDetail {
                name: factor_display_name(&f.name).to_string(),
                avg_importance: f.importance,
                description: factor_description(&f.name).to_string(),
            })
            .collect(),
    }
}

/// Model metadata and fit scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model family.
    pub model_type: String,
    /// Feature columns the model consumed, in training order.
    pub features_used: Vec<String>,
    /// R² on the training subset.
    pub training_accuracy: f64,
    /// R² on the held-out subset.
    pub test_accuracy: f64,
    /// Held-out R², kept under the name the dashboard reads.
    pub cross_validation_score: f64,
    /// Rows the model trained on.
    pub total_data_points: usize,
    /// Inclusive year span of the panel, `"{min}-{max}"`.
    pub training_period: String,
}

/// Build the model-info artifact from the whole-panel model.
pub fn model_info(panel: &Panel, model: &TrainedModel) -> ModelInfo {
    let years = panel.years();
    let training_period = match (years.first(), years.last()) {
        (Some(first), Some(last)) => format!("{first}-{last}"),
        _ => String::new(),
    };

    ModelInfo {
        model_type: MODEL_TYPE.to_string(),
        features_used: model.feature_names().to_vec(),
        training_accuracy: model.train_r2,
        test_accuracy: model.test_r2,
        cross_validation_score: model.test_r2,
        total_data_points: model.n_samples,
        training_period,
    }
}

// ---------------------------------------------------------------------
// Global statistics
// ---------------------------------------------------------------------

/// One extremum month in the statistics artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthExtreme {
    /// Indonesian month name.
    pub month: String,
    /// Total cases that month.
    pub cases: u64,
    /// Dominant factor that month.
    pub dominant_factor: String,
}

/// Whole-scope statistics with extrema and factor frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Cases summed over every month in scope.
    pub total_cases: u64,
    /// Mean monthly total, 2 decimals.
    pub average_monthly_cases: f64,
    /// Month with the most cases; ties go to the earliest month.
    pub highest_month: MonthExtreme,
    /// Month with the fewest cases; ties go to the earliest month.
    pub lowest_month: MonthExtreme,
    /// How often each factor ranked first, keyed by display name.
    pub dominant_factor_frequency: BTreeMap<String, u32>,
    /// Mean held-out R² over the months, 4 decimals.
    pub average_prediction_accuracy: f64,
    /// Model family.
    pub model_type: String,
}

/// Compute statistics over already-built monthly results.
///
/// Returns `None` when the scope held no months at all.
pub fn statistics(monthly: &[MonthlyResult]) -> Option<Statistics> {
    let first = monthly.first()?;
    let n = monthly.len() as f64;

    let total_cases: u64 = monthly.iter().map(|m| m.total_cases).sum();

    // Strict comparisons keep the earliest month on ties; the input is
    // already in month order.
    let mut highest = first;
    let mut lowest = first;
    for result in monthly {
        if result.total_cases > highest.total_cases {
            highest = result;
        }
        if result.total_cases < lowest.total_cases {
            lowest = result;
        }
    }

    let mut frequency: BTreeMap<String, u32> = BTreeMap::new();
    for result in monthly {
        *frequency
            .entry(result.most_influential_factor.clone())
            .or_insert(0) += 1;
    }

    let accuracy = monthly.iter().map(|m| m.prediction_accuracy).sum::<f64>() / n;

    let extreme = |result: &MonthlyResult| MonthExtreme {
        month: result.month.clone(),
        cases: result.total_cases,
        dominant_factor: result.most_influential_factor.clone(),
    };

    Some(Statistics {
        total_cases,
        average_monthly_cases: round_to(total_cases as f64 / n, 2),
        highest_month: extreme(highest),
        lowest_month: extreme(lowest),
        dominant_factor_frequency: frequency,
        average_prediction_accuracy: round_to(accuracy, 4),
        model_type: MODEL_TYPE.to_string(),
    })
}

// ---------------------------------------------------------------------
// Chart payloads
// ---------------------------------------------------------------------

/// Series bundle of the line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDatasets {
    /// Monthly case totals.
    pub total_cases: Vec<u64>,
    /// Monthly mean rainfall.
    pub rainfall: Vec<f64>,
}

/// Case/rainfall line chart payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    /// Month names in order.
    pub labels: Vec<String>,
    /// The plotted series.
    pub datasets: LineDatasets,
}

/// Build the line chart from monthly aggregates.
pub fn line_chart(monthly: &[MonthlyAggregate]) -> LineChart {
    LineChart {
        labels: monthly.iter().map(|m| m.month.clone()).collect(),
        datasets: LineDatasets {
            total_cases: monthly.iter().map(|m| m.total_cases).collect(),
            rainfall: monthly.iter().map(|m| m.rainfall_mm).collect(),
        },
    }
}

/// Factor-importance bar chart payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    /// Month names in order.
    pub labels: Vec<String>,
    /// Top-factor importance per month.
    pub primary_importance: Vec<f64>,
    /// Second-factor importance per month.
    pub secondary_importance: Vec<f64>,
    /// Third-factor importance per month.
    pub tertiary_importance: Vec<f64>,
    /// Top-factor display name per month.
    pub primary_factors: Vec<String>,
}

/// Build the bar chart from monthly results.
pub fn bar_chart(monthly: &[MonthlyResult]) -> BarChart {
    BarChart {
        labels: monthly.iter().map(|m| m.month.clone()).collect(),
        primary_importance: monthly.iter().map(|m| m.factor_importance).collect(),
        secondary_importance: monthly.iter().map(|m| m.secondary_importance).collect(),
        tertiary_importance: monthly.iter().map(|m| m.tertiary_importance).collect(),
        primary_factors: monthly
            .iter()
            .map(|m| m.most_influential_factor.clone())
            .collect(),
    }
}

/// Point-cloud scatter payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scatter {
    /// Covariate values, ascending.
    pub x: Vec<f64>,
    /// Case counts aligned with `x`.
    pub y: Vec<u64>,
    /// Point labels aligned with `x`.
    pub labels: Vec<String>,
    /// Axis label for `x`.
    pub x_label: String,
    /// Axis label for `y`.
    pub y_label: String,
}

const LABEL_MONTHLY_CASES: &str = "Kasus Bulanan";
const LABEL_RAINFALL: &str = "Curah Hujan (mm)";
const LABEL_DENSITY: &str = "Kepadatan Penduduk (per km²)";

/// Scatter of monthly totals against one covariate axis.
pub fn factor_scatter(monthly: &[MonthlyAggregate], axis: FactorAxis) -> Scatter {
    let mut points: Vec<(f64, u64, String)> = monthly
        .iter()
        .map(|m| {
            let x = match axis {
                FactorAxis::Rainfall => m.rainfall_mm,
                FactorAxis::PopulationDensity => m.population_density,
            };
            (x, m.total_cases, m.month.clone())
        })
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    Scatter {
        x: points.iter().map(|p| p.0).collect(),
        y: points.iter().map(|p| p.1).collect(),
        labels: points.iter().map(|p| p.2.clone()).collect(),
        x_label: match axis {
            FactorAxis::Rainfall => LABEL_RAINFALL.to_string(),
            FactorAxis::PopulationDensity => LABEL_DENSITY.to_string(),
        },
        y_label: LABEL_MONTHLY_CASES.to_string(),
    }
}

/// Scatter of one region's monthly cases against rainfall.
pub fn region_rainfall_scatter(panel: &Panel, region: &str, year: Option<i32>) -> Scatter {
    let mut points: Vec<(f64, u64, String)> = panel
        .for_region(region)
        .filter(|o| year.is_none_or(|y| o.year == y))
        .map(|o| {
            let label = schema::month_abbrev(o.month)
                .map_or_else(|| "N/A".to_string(), |abbrev| format!("{abbrev} {}", o.year));
            (round_to(o.rainfall_mm, 2), o.monthly_cases as u64, label)
        })
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    Scatter {
        x: points.iter().map(|p| p.0).collect(),
        y: points.iter().map(|p| p.1).collect(),
        labels: points.iter().map(|p| p.2.clone()).collect(),
        x_label: LABEL_RAINFALL.to_string(),
        y_label: LABEL_MONTHLY_CASES.to_string(),
    }
}

/// One plotted point of the population scatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationPoint {
    /// Population density of the region.
    pub x: f64,
    /// Total cases over the scope.
    pub y: u64,
    /// Region name.
    pub name: String,
}

/// One region's series in the population scatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeries {
    /// Region name.
    pub name: String,
    /// The region's single point.
    pub data: Vec<PopulationPoint>,
}

/// Density-against-cases scatter, one series per region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationScatter {
    /// Region series, sorted by region name.
    pub series: Vec<RegionSeries>,
    /// Axis label for `x`.
    pub x_label: String,
    /// Axis label for `y`.
    pub y_label: String,
}

/// Build the population scatter over a scope.
pub fn population_scatter(panel: &Panel, year: Option<i32>) -> PopulationScatter {
    let mut by_region: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
    for obs in scoped(panel, year) {
        by_region.entry(obs.region.as_str()).or_default().push(obs);
    }

    let series = by_region
        .into_iter()
        .map(|(region, rows)| {
            let total_cases = rows.iter().map(|o| o.monthly_cases as u64).sum();
            let density = rows[0].population_density;
            RegionSeries {
                name: region.to_string(),
                data: vec![PopulationPoint {
                    x: density,
                    y: total_cases,
                    name: region.to_string(),
                }],
            }
        })
        .collect();

    PopulationScatter {
        series,
        x_label: LABEL_DENSITY.to_string(),
        y_label: "Total Kasus Tahunan".to_string(),
    }
}

// ---------------------------------------------------------------------
// Raw data and indexes
// ---------------------------------------------------------------------

/// Raw observations of a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    /// Rows in scope.
    pub total: usize,
    /// Rows in this payload (always equals `total`; no pagination).
    pub count: usize,
    /// The observations.
    pub data: Vec<Observation>,
}

/// Export the raw observations of a scope.
pub fn raw_data(panel: &Panel, year: Option<i32>) -> RawData {
    let data: Vec<Observation> = scoped(panel, year).into_iter().cloned().collect();
    RawData {
        total: data.len(),
        count: data.len(),
        data,
    }
}

/// Year span of the raw-data summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearCoverage {
    /// Earliest year.
    pub min: i32,
    /// Latest year.
    pub max: i32,
    /// Every realized year, ascending.
    pub unique: Vec<i32>,
}

/// Province coverage of the raw-data summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceCoverage {
    /// Distinct provinces.
    pub count: usize,
    /// Province names, ascending.
    pub list: Vec<String>,
}

/// Case-count distribution of the raw-data summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStats {
    /// Sum of monthly cases.
    pub total: u64,
    /// Smallest monthly count.
    pub min: u32,
    /// Largest monthly count.
    pub max: u32,
    /// Mean monthly count.
    pub mean: f64,
}

/// Coverage summary of the raw observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDataSummary {
    /// Observation count.
    pub total_records: usize,
    /// Year coverage.
    pub years: YearCoverage,
    /// Province coverage.
    pub provinces: ProvinceCoverage,
    /// Distinct region count.
    pub regions: usize,
    /// Case distribution.
    pub cases: CaseStats,
    /// Source column names.
    pub columns: Vec<String>,
}

/// Build the raw-data summary over the whole panel.
pub fn raw_data_summary(panel: &Panel) -> RawDataSummary {
    let observations = panel.observations();
    let years = panel.years();
    let provinces = panel.provinces();

    let counts: Vec<u32> = observations.iter().map(|o| o.monthly_cases).collect();
    let total: u64 = counts.iter().map(|&c| c as u64).sum();

    RawDataSummary {
        total_records: observations.len(),
        years: YearCoverage {
            min: years.first().copied().unwrap_or_default(),
            max: years.last().copied().unwrap_or_default(),
            unique: years,
        },
        provinces: ProvinceCoverage {
            count: provinces.len(),
            list: provinces,
        },
        regions: panel.regions().len(),
        cases: CaseStats {
            total,
            min: counts.iter().copied().min().unwrap_or_default(),
            max: counts.iter().copied().max().unwrap_or_default(),
            mean: round_to(total as f64 / counts.len().max(1) as f64, 2),
        },
        columns: REQUIRED_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
    }
}

/// Reverse index of years with artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableYears {
    /// Realized years, ascending.
    pub years: Vec<i32>,
    /// Earliest year.
    pub min: i32,
    /// Latest year.
    pub max: i32,
    /// Year a consumer should select first (the latest).
    pub default: i32,
}

/// Build the year index from the panel's realized years.
pub fn available_years(panel: &Panel) -> AvailableYears {
    let years = panel.years();
    AvailableYears {
        min: years.first().copied().unwrap_or_default(),
        max: years.last().copied().unwrap_or_default(),
        default: years.last().copied().unwrap_or_default(),
        years,
    }
}

/// Reverse index of regions with artifacts in a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableRegions {
    /// Region names, ascending.
    pub regions: Vec<String>,
    /// Number of regions.
    pub count: usize,
}

/// Build the region index for a scope.
pub fn available_regions(panel: &Panel, year: Option<i32>) -> AvailableRegions {
    let regions = match year {
        Some(y) => panel.regions_in_year(y),
        None => panel.regions(),
    };
    AvailableRegions {
        count: regions.len(),
        regions,
    }
}

#[cfg(test)]
mod tests {
    use aedes_model::{train_partition, Dataset, ForestConfig, Partition, TrainerConfig};
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    fn panel() -> Panel {
        let mut observations = Vec::new();
        for (region, density) in [("Bandung", 8000.0), ("Bogor", 3000.0)] {
            for year in [2020, 2021] {
                for month in 1..=3u32 {
                    observations.push(Observation {
                        province: "Jawa Barat".to_string(),
                        region: region.to_string(),
                        year,
                        month,
                        monthly_cases: month * 10 + u32::from(region == "Bogor"),
                        annual_cases: 200,
                        rainfall_mm: 50.0 * month as f64,
                        population_density: density,
                    });
                }
            }
        }
        Panel::from_observations(observations).unwrap()
    }

    fn model() -> TrainedModel {
        let mut dataset = Dataset::new(vec![
            "jumlah_curah_hujan".to_string(),
            "kepadatan_penduduk".to_string(),
            "bulan".to_string(),
        ]);
        for i in 0..40 {
            let rain = (i % 10) as f64 * 25.0;
            dataset.add_sample(vec![rain, 5000.0, (i % 12 + 1) as f64], rain * 0.4);
        }
        let config = TrainerConfig {
            forest: ForestConfig {
                n_trees: 10,
                max_depth: 6,
                ..Default::default()
            },
            ..Default::default()
        };
        train_partition(&dataset, Partition::AllYears, &config).unwrap()
    }

    #[rstest]
    #[case(50.0, 50.0)]
    #[case(99.4, 99.4)]
    #[case(100.4, 100.0)]
    #[case(689.7, 690.0)]
    #[case(15.64, 15.6)]
    #[case(1.944, 1.94)]
    #[case(0.1234, 0.123)]
    fn density_formatting_keeps_three_significant_figures(
        #[case] input: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(format_population_density(input), expected);
    }

    #[test]
    fn monthly_aggregates_sum_over_regions() {
        let aggregates = monthly_aggregates(&panel(), Some(2020));
        assert_eq!(aggregates.len(), 3);
        // Month 1: Bandung 10 + Bogor 11.
        assert_eq!(aggregates[0].total_cases, 21);
        assert_eq!(aggregates[0].month, "Januari");
        assert_eq!(aggregates[0].year, Some(2020));
    }

    #[test]
    fn unfiltered_scope_pools_years() {
        let aggregates = monthly_aggregates(&panel(), None);
        // Month 1 over both years and regions: (10 + 11) * 2.
        assert_eq!(aggregates[0].total_cases, 42);
        assert_eq!(aggregates[0].year, None);
    }

    #[test]
    fn monthly_results_carry_the_ranked_factors() {
        let model = model();
        let results = monthly_results(&panel(), Some(2020), &model);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].most_influential_factor,
            factor_display_name(&model.importance[0].name)
        );
        assert_relative_eq!(results[0].factor_importance, model.importance[0].importance);
    }

    #[test]
    fn regional_summaries_sum_and_sort() {
        let summaries = regional_summaries(&panel(), Some(2020), &model());
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].region, "Bandung");
        assert_eq!(summaries[0].total_cases, 60);
        assert_eq!(summaries[1].region, "Bogor");
        assert_eq!(summaries[1].total_cases, 63);
    }

    #[test]
    fn statistics_break_ties_on_the_earliest_month() {
        let model = model();
        let mut results = monthly_results(&panel(), Some(2020), &model);
        // Force a tie between months 1 and 2.
        results[1].total_cases = results[0].total_cases;
        let stats = statistics(&results).unwrap();
        assert_eq!(stats.lowest_month.month, "Januari");
    }

    #[test]
    fn statistics_over_empty_scope_is_none() {
        assert!(statistics(&[]).is_none());
    }

    #[test]
    fn factor_scatter_sorts_by_covariate() {
        let aggregates = monthly_aggregates(&panel(), Some(2020));
        let scatter = factor_scatter(&aggregates, FactorAxis::Rainfall);
        assert!(scatter.x.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(scatter.x_label, "Curah Hujan (mm)");
    }

    #[test]
    fn region_scatter_is_scoped_and_labeled() {
        let scatter = region_rainfall_scatter(&panel(), "Bandung", Some(2021));
        assert_eq!(scatter.x.len(), 3);
        assert!(scatter.labels.iter().all(|l| l.ends_with("2021")));
    }

    #[test]
    fn population_scatter_has_one_series_per_region() {
        let scatter = population_scatter(&panel(), None);
        assert_eq!(scatter.series.len(), 2);
        assert_eq!(scatter.series[0].name, "Bandung");
        assert_eq!(scatter.series[0].data[0].x, 8000.0);
    }

    #[test]
    fn region_index_excludes_unobserved_years() {
        let index = available_regions(&panel(), Some(2019));
        assert!(index.regions.is_empty());
        assert_eq!(index.count, 0);
    }

    #[test]
    fn raw_summary_counts_coverage() {
        let summary = raw_data_summary(&panel());
        assert_eq!(summary.total_records, 12);
        assert_eq!(summary.years.unique, vec![2020, 2021]);
        assert_eq!(summary.provinces.count, 1);
        assert_eq!(summary.regions, 2);
        assert_eq!(summary.columns.len(), 8);
    }
}
